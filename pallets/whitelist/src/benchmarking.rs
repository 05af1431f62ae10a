//! Benchmarking setup for pallet-whitelist-registry

use super::*;

#[allow(unused)]
use crate::Pallet as Whitelist;
use frame_benchmarking::v2::*;

#[benchmarks]
mod benchmarks {
    use super::*;

    #[benchmark]
    fn approve_investor() {
        let investor: T::AccountId = account("investor", 0, 0);
        let origin = T::AdminOrigin::try_successful_origin().expect("Admin origin");

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin, investor.clone());

        assert_eq!(Investors::<T>::get(&investor), true);
    }

    #[benchmark]
    fn disapprove_investor() {
        let investor: T::AccountId = account("investor", 0, 0);
        Investors::<T>::insert(&investor, true);
        let origin = T::AdminOrigin::try_successful_origin().expect("Admin origin");

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin, investor.clone());

        assert_eq!(Investors::<T>::get(&investor), false);
    }

    impl_benchmark_test_suite!(Whitelist, crate::mock::new_test_ext(), crate::mock::Test);
}
