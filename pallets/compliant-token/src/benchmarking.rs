//! Benchmarking setup for pallet-compliant-token

use super::*;

#[allow(unused)]
use crate::Pallet as CompliantToken;
use frame_benchmarking::v2::*;
use frame_system::RawOrigin;

const SEED: u32 = 0;

fn funded_member<T: Config>(name: &'static str, index: u32, balance: u128) -> T::AccountId {
    let who: T::AccountId = account(name, index, SEED);
    T::BenchmarkHelper::add_member(&who);
    if balance > 0 {
        Balances::<T>::insert(&who, balance);
    }
    who
}

fn fee_setup<T: Config>() -> T::AccountId {
    let recipient: T::AccountId = account("fees", 100, SEED);
    TransferFee::<T>::put(10);
    FeeRecipient::<T>::put(&recipient);
    recipient
}

#[benchmarks]
mod benchmarks {
    use super::*;

    #[benchmark]
    fn transfer() {
        fee_setup::<T>();
        let from = funded_member::<T>("from", 0, 1_000_000);
        let to = funded_member::<T>("to", 1, 0);

        #[extrinsic_call]
        _(RawOrigin::Signed(from.clone()), to, 100);

        assert_eq!(PendingApprovalAmounts::<T>::get(&from, &None::<T::AccountId>), 110);
        assert!(PendingTransfers::<T>::get(0).is_some());
    }

    #[benchmark]
    fn transfer_from() {
        fee_setup::<T>();
        let from = funded_member::<T>("from", 0, 1_000_000);
        let to = funded_member::<T>("to", 1, 0);
        let spender = funded_member::<T>("spender", 2, 0);
        Allowances::<T>::insert(&from, &spender, 1_000u128);

        #[extrinsic_call]
        _(RawOrigin::Signed(spender.clone()), from.clone(), to, 100);

        assert_eq!(Allowances::<T>::get(&from, &spender), 890);
        assert_eq!(PendingApprovalAmounts::<T>::get(&from, &Some(spender)), 110);
    }

    #[benchmark]
    fn approve_spender() {
        let owner: T::AccountId = account("owner", 0, SEED);
        let spender: T::AccountId = account("spender", 1, SEED);

        #[extrinsic_call]
        _(RawOrigin::Signed(owner.clone()), spender.clone(), 1_000);

        assert_eq!(Allowances::<T>::get(&owner, &spender), 1_000);
    }

    #[benchmark]
    fn approve_transfer() {
        let recipient = fee_setup::<T>();
        let from = funded_member::<T>("from", 0, 1_000_000);
        let to = funded_member::<T>("to", 1, 0);
        let validator: T::AccountId = account("validator", 2, SEED);
        Validator::<T>::put(&validator);
        CompliantToken::<T>::transfer(RawOrigin::Signed(from.clone()).into(), to.clone(), 100)
            .expect("submission succeeds");

        #[extrinsic_call]
        _(RawOrigin::Signed(validator), 0);

        assert_eq!(Balances::<T>::get(&to), 100);
        assert_eq!(Balances::<T>::get(&recipient), 10);
        assert!(PendingTransfers::<T>::get(0).is_none());
    }

    #[benchmark]
    fn reject_transfer() {
        fee_setup::<T>();
        let from = funded_member::<T>("from", 0, 1_000_000);
        let to = funded_member::<T>("to", 1, 0);
        let validator: T::AccountId = account("validator", 2, SEED);
        Validator::<T>::put(&validator);
        CompliantToken::<T>::transfer(RawOrigin::Signed(from.clone()).into(), to, 100)
            .expect("submission succeeds");

        #[extrinsic_call]
        _(RawOrigin::Signed(validator), 0, 1);

        assert!(PendingTransfers::<T>::get(0).is_none());
        assert_eq!(PendingApprovalAmounts::<T>::get(&from, &None::<T::AccountId>), 0);
    }

    #[benchmark]
    fn set_fee() {
        let validator: T::AccountId = account("validator", 0, SEED);
        Validator::<T>::put(&validator);

        #[extrinsic_call]
        _(RawOrigin::Signed(validator), 25);

        assert_eq!(TransferFee::<T>::get(), 25);
    }

    #[benchmark]
    fn set_fee_recipient() {
        let validator: T::AccountId = account("validator", 0, SEED);
        Validator::<T>::put(&validator);
        let recipient: T::AccountId = account("fees", 1, SEED);

        #[extrinsic_call]
        _(RawOrigin::Signed(validator), recipient.clone());

        assert_eq!(FeeRecipient::<T>::get(), Some(recipient));
    }

    #[benchmark]
    fn set_new_validator() {
        let validator: T::AccountId = account("validator", 0, SEED);
        Validator::<T>::put(&validator);
        let successor: T::AccountId = account("successor", 1, SEED);

        #[extrinsic_call]
        _(RawOrigin::Signed(validator), successor.clone());

        assert_eq!(Validator::<T>::get(), Some(successor));
    }

    #[benchmark]
    fn mint() {
        let owner: T::AccountId = account("owner", 0, SEED);
        Owner::<T>::put(&owner);
        let to: T::AccountId = account("to", 1, SEED);

        #[extrinsic_call]
        _(RawOrigin::Signed(owner), to.clone(), 1_000);

        assert_eq!(Balances::<T>::get(&to), 1_000);
        assert_eq!(TotalSupply::<T>::get(), 1_000);
    }

    #[benchmark]
    fn transfer_ownership() {
        let owner: T::AccountId = account("owner", 0, SEED);
        Owner::<T>::put(&owner);
        let successor: T::AccountId = account("successor", 1, SEED);

        #[extrinsic_call]
        _(RawOrigin::Signed(owner), successor.clone());

        assert_eq!(Owner::<T>::get(), Some(successor));
    }

    impl_benchmark_test_suite!(CompliantToken, crate::mock::new_test_ext(), crate::mock::Test);
}
