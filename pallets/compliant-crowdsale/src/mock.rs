use crate as pallet_compliant_crowdsale;
use frame_support::{
    derive_impl, parameter_types,
    traits::{ConstU32, ConstU64},
    PalletId,
};
use sp_core::H256;
use sp_runtime::{
    traits::{AccountIdConversion, BlakeTwo256, IdentityLookup},
    BuildStorage,
};

type Block = frame_system::mocking::MockBlock<Test>;

// Accounts used throughout the tests.
pub const ADMIN: u64 = 1;
pub const VALIDATOR: u64 = 2;
pub const WALLET: u64 = 3;
pub const INVESTOR: u64 = 4;
pub const UNAPPROVED: u64 = 5;
pub const NEW_VALIDATOR: u64 = 6;

pub const RATE: u128 = 10;
pub const SALE_START: u64 = 1_000_000;
pub const SALE_END: u64 = 2_000_000;
pub const INVESTOR_FUNDS: u64 = 10_000;

// Configure a mock runtime to test the pallet.
frame_support::construct_runtime!(
    pub enum Test {
        System: frame_system,
        Timestamp: pallet_timestamp,
        Balances: pallet_balances,
        Whitelist: pallet_whitelist_registry,
        CompliantToken: pallet_compliant_token,
        CompliantCrowdsale: pallet_compliant_crowdsale,
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
    type AccountData = pallet_balances::AccountData<u64>;
    type OnNewAccount = ();
    type OnKilledAccount = ();
    type SystemWeightInfo = ();
    type SS58Prefix = ();
    type OnSetCode = ();
    type MaxConsumers = ConstU32<16>;
}

impl pallet_timestamp::Config for Test {
    type Moment = u64;
    type OnTimestampSet = ();
    type MinimumPeriod = ConstU64<5>;
    type WeightInfo = ();
}

#[derive_impl(pallet_balances::config_preludes::TestDefaultConfig)]
impl pallet_balances::Config for Test {
    type AccountStore = System;
}

parameter_types! {
    pub const AdminAccount: u64 = ADMIN;
    pub const SalePalletId: PalletId = PalletId(*b"py/cmpsl");
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

impl pallet_compliant_crowdsale::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type AdminOrigin = EnsureAdmin;
    type Membership = Whitelist;
    type Currency = Balances;
    type TimeProvider = Timestamp;
    type Token = CompliantToken;
    type PalletId = SalePalletId;
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper = WhitelistHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct WhitelistHelper;

#[cfg(feature = "runtime-benchmarks")]
impl pallet_compliant_token::BenchmarkHelper<u64> for WhitelistHelper {
    fn add_member(account: &u64) {
        pallet_whitelist_registry::Investors::<Test>::insert(account, true);
    }
}

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<u64> for WhitelistHelper {
    fn add_member(account: &u64) {
        pallet_whitelist_registry::Investors::<Test>::insert(account, true);
    }

    fn set_token_issuer(issuer: &u64) {
        pallet_compliant_token::Owner::<Test>::put(issuer);
    }
}

/// The sale's sovereign account, derived from the pallet id.
pub fn sale_account() -> u64 {
    SalePalletId::get().into_account_truncating()
}

/// Timestamp storage is in milliseconds; the sale window is in unix seconds.
pub fn set_time_secs(secs: u64) {
    Timestamp::set_timestamp(secs * 1_000);
}

// Build genesis storage according to the mock runtime.
pub fn new_test_ext() -> sp_io::TestExternalities {
    let mut t = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();

    pallet_balances::GenesisConfig::<Test> {
        balances: vec![(INVESTOR, INVESTOR_FUNDS)],
        ..Default::default()
    }
    .assimilate_storage(&mut t)
    .unwrap();

    pallet_whitelist_registry::GenesisConfig::<Test> { approved_investors: vec![INVESTOR] }
        .assimilate_storage(&mut t)
        .unwrap();

    // The sale's sovereign account holds the token's mint authority.
    pallet_compliant_token::GenesisConfig::<Test> {
        token_name: b"Sale Token".to_vec(),
        token_symbol: b"SLT".to_vec(),
        decimals: 18,
        owner: Some(sale_account()),
        validator: Some(VALIDATOR),
        transfer_fee: 0,
        fee_recipient: None,
        initial_balances: vec![],
    }
    .assimilate_storage(&mut t)
    .unwrap();

    pallet_compliant_crowdsale::GenesisConfig::<Test> {
        rate: RATE,
        wallet: Some(WALLET),
        start_time: SALE_START,
        end_time: SALE_END,
        validator: Some(VALIDATOR),
    }
    .assimilate_storage(&mut t)
    .unwrap();

    let mut ext: sp_io::TestExternalities = t.into();
    ext.execute_with(|| set_time_secs(SALE_START));
    ext
}
