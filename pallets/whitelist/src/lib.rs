#![cfg_attr(not(feature = "std"), no_std)]
// Allow deprecated weight constants for MVP (will be replaced by benchmarks post-grant)
#![allow(deprecated)]

use frame_support::{pallet_prelude::*, traits::Contains, traits::EnsureOrigin};
use frame_system::pallet_prelude::*;
use sp_std::prelude::*;

pub use pallet::*;

#[cfg(test)]
mod mock;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

/// The current storage version.
const STORAGE_VERSION: StorageVersion = StorageVersion::new(1);

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;
        type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;
    }

    #[pallet::pallet]
    #[pallet::storage_version(STORAGE_VERSION)]
    pub struct Pallet<T>(_);

    /// Approved investors. Consulted by the token and crowdsale pallets,
    /// mutated only through the admin origin.
    #[pallet::storage]
    #[pallet::getter(fn is_investor_approved)]
    pub type Investors<T: Config> =
        StorageMap<_, Blake2_128Concat, T::AccountId, bool, ValueQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// Investor approved to send and receive
        InvestorApproved { investor: T::AccountId },
        /// Investor approval revoked
        InvestorDisapproved { investor: T::AccountId },
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Approve an investor. Idempotent: re-approving emits the event again.
        #[pallet::call_index(0)]
        #[pallet::weight(10_000)]
        pub fn approve_investor(origin: OriginFor<T>, investor: T::AccountId) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            Investors::<T>::insert(&investor, true);

            log::debug!(target: "runtime::whitelist", "investor approved");

            Self::deposit_event(Event::InvestorApproved { investor });
            Ok(())
        }

        /// Revoke an investor's approval. Idempotent.
        #[pallet::call_index(1)]
        #[pallet::weight(10_000)]
        pub fn disapprove_investor(origin: OriginFor<T>, investor: T::AccountId) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            Investors::<T>::remove(&investor);

            log::debug!(target: "runtime::whitelist", "investor approval revoked");

            Self::deposit_event(Event::InvestorDisapproved { investor });
            Ok(())
        }
    }

    #[pallet::genesis_config]
    #[derive(frame_support::DefaultNoBound)]
    pub struct GenesisConfig<T: Config> {
        /// Investors approved at genesis
        pub approved_investors: Vec<T::AccountId>,
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            for investor in &self.approved_investors {
                Investors::<T>::insert(investor, true);
            }
        }
    }
}

impl<T: Config> Contains<T::AccountId> for Pallet<T> {
    fn contains(account: &T::AccountId) -> bool {
        Investors::<T>::get(account)
    }
}
