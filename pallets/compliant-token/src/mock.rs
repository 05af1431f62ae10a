use crate as pallet_compliant_token;
use frame_support::{
    derive_impl, parameter_types,
    traits::{ConstU32, ConstU64},
};
use sp_core::H256;
use sp_runtime::{
    traits::{BlakeTwo256, IdentityLookup},
    BuildStorage,
};

type Block = frame_system::mocking::MockBlock<Test>;

// Accounts used throughout the tests.
pub const OWNER: u64 = 1;
pub const FEE_RECIPIENT: u64 = 2;
pub const NEW_FEE_RECIPIENT: u64 = 3;
pub const APPROVED: u64 = 4;
pub const UNAPPROVED: u64 = 5;
pub const VALIDATOR: u64 = 6;

pub const INITIAL_SUPPLY: u128 = 1_000;
pub const TRANSFER_FEE: u128 = 10;

// Configure a mock runtime to test the pallet.
frame_support::construct_runtime!(
    pub enum Test {
        System: frame_system,
        Whitelist: pallet_whitelist_registry,
        CompliantToken: pallet_compliant_token,
    }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
    type BaseCallFilter = frame_support::traits::Everything;
    type BlockWeights = ();
    type BlockLength = ();
    type DbWeight = ();
    type RuntimeOrigin = RuntimeOrigin;
    type RuntimeCall = RuntimeCall;
    type Nonce = u64;
    type Hash = H256;
    type Hashing = BlakeTwo256;
    type AccountId = u64;
    type Lookup = IdentityLookup<Self::AccountId>;
    type Block = Block;
    type RuntimeEvent = RuntimeEvent;
    type BlockHashCount = ConstU64<250>;
    type Version = ();
    type PalletInfo = PalletInfo;
    type AccountData = ();
    type OnNewAccount = ();
    type OnKilledAccount = ();
    type SystemWeightInfo = ();
    type SS58Prefix = ();
    type OnSetCode = ();
    type MaxConsumers = ConstU32<16>;
}

parameter_types! {
    pub const AdminAccount: u64 = OWNER;
}

pub struct EnsureAdmin;
impl frame_support::traits::EnsureOrigin<RuntimeOrigin> for EnsureAdmin {
    type Success = u64;

    fn try_origin(o: RuntimeOrigin) -> Result<Self::Success, RuntimeOrigin> {
        match o.clone().into() {
            Ok(frame_system::RawOrigin::Signed(account)) if account == AdminAccount::get() => {
                Ok(account)
            }
            _ => Err(o),
        }
    }

    #[cfg(feature = "runtime-benchmarks")]
    fn try_successful_origin() -> Result<RuntimeOrigin, ()> {
        Ok(RuntimeOrigin::signed(AdminAccount::get()))
    }
}

impl pallet_whitelist_registry::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type AdminOrigin = EnsureAdmin;
}

impl pallet_compliant_token::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type Membership = Whitelist;
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper = WhitelistHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct WhitelistHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<u64> for WhitelistHelper {
    fn add_member(account: &u64) {
        pallet_whitelist_registry::Investors::<Test>::insert(account, true);
    }
}

// Build genesis storage according to the mock runtime.
pub fn new_test_ext() -> sp_io::TestExternalities {
    let mut t = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();

    pallet_whitelist_registry::GenesisConfig::<Test> {
        approved_investors: vec![OWNER, FEE_RECIPIENT, APPROVED],
    }
    .assimilate_storage(&mut t)
    .unwrap();

    pallet_compliant_token::GenesisConfig::<Test> {
        token_name: b"Test Token".to_vec(),
        token_symbol: b"TST".to_vec(),
        decimals: 18,
        owner: Some(OWNER),
        validator: Some(VALIDATOR),
        transfer_fee: TRANSFER_FEE,
        fee_recipient: Some(FEE_RECIPIENT),
        initial_balances: vec![(OWNER, INITIAL_SUPPLY)],
    }
    .assimilate_storage(&mut t)
    .unwrap();

    t.into()
}
