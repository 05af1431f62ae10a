#![cfg_attr(not(feature = "std"), no_std)]
// Allow deprecated weight constants for MVP (will be replaced by benchmarks post-grant)
#![allow(deprecated)]

use frame_support::{
    dispatch::DispatchResult,
    ensure,
    pallet_prelude::*,
    traits::{Contains, Currency, ExistenceRequirement, UnixTime},
    PalletId,
};
use frame_system::{ensure_signed, pallet_prelude::*};
use pallet_compliant_token::TokenIssuance;
use sp_runtime::traits::{AccountIdConversion, Saturating, UniqueSaturatedInto, Zero};

pub use pallet::*;

#[cfg(test)]
mod mock;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

/// The current storage version.
const STORAGE_VERSION: StorageVersion = StorageVersion::new(1);

pub type BalanceOf<T> =
    <<T as Config>::Currency as Currency<<T as frame_system::Config>::AccountId>>::Balance;

/// A purchase recorded at submission time, awaiting the validator's decision.
/// The contribution sits in the sale's sovereign account until the entry is
/// settled; a rejected entry leaves it there for an external refund path.
#[derive(Clone, PartialEq, Eq, Encode, Decode, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct PendingMint<AccountId, Balance> {
    pub beneficiary: AccountId,
    pub tokens: u128,
    pub contribution: Balance,
}

/// Lets benchmarks register accounts with the membership oracle and hand the
/// token's mint authority to the sale account, both of which live outside
/// this pallet.
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
    fn add_member(account: &AccountId);
    fn set_token_issuer(issuer: &AccountId);
}

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;
        /// Origin allowed to reassign the token's mint authority away from
        /// the sale.
        type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;
        /// Membership oracle; beneficiaries are checked at submission and
        /// re-checked at settlement.
        type Membership: Contains<Self::AccountId>;
        /// Custody of sale proceeds.
        type Currency: Currency<Self::AccountId>;
        /// Wall-clock source for the sale window, in unix seconds.
        type TimeProvider: UnixTime;
        /// The token being sold. The sale's sovereign account must hold the
        /// token's mint authority for settlements to succeed.
        type Token: TokenIssuance<Self::AccountId>;
        /// Derives the sale's sovereign account.
        #[pallet::constant]
        type PalletId: Get<PalletId>;
        #[cfg(feature = "runtime-benchmarks")]
        type BenchmarkHelper: BenchmarkHelper<Self::AccountId>;
    }

    #[pallet::pallet]
    #[pallet::storage_version(STORAGE_VERSION)]
    pub struct Pallet<T>(_);

    /// Tokens minted per unit of contributed currency.
    #[pallet::storage]
    #[pallet::getter(fn rate)]
    pub type Rate<T> = StorageValue<_, u128, ValueQuery>;

    /// Destination for settled proceeds.
    #[pallet::storage]
    #[pallet::getter(fn wallet)]
    pub type Wallet<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    /// Sale opens at this unix timestamp (inclusive).
    #[pallet::storage]
    #[pallet::getter(fn start_time)]
    pub type StartTime<T> = StorageValue<_, u64, ValueQuery>;

    /// Sale closes after this unix timestamp (inclusive).
    #[pallet::storage]
    #[pallet::getter(fn end_time)]
    pub type EndTime<T> = StorageValue<_, u64, ValueQuery>;

    /// The single account allowed to settle or reject pending mints.
    #[pallet::storage]
    #[pallet::getter(fn validator)]
    pub type Validator<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    /// Purchases awaiting the validator's decision, keyed by mint-nonce.
    /// Absent means never submitted or already settled/rejected.
    #[pallet::storage]
    #[pallet::getter(fn pending_mints)]
    pub type PendingMints<T: Config> =
        StorageMap<_, Blake2_128Concat, u64, PendingMint<T::AccountId, BalanceOf<T>>, OptionQuery>;

    /// Next mint-nonce to assign; independent of the token's transfer nonces.
    #[pallet::storage]
    #[pallet::getter(fn current_mint_nonce)]
    pub type CurrentMintNonce<T> = StorageValue<_, u64, ValueQuery>;

    /// Proceeds forwarded to the wallet by settled purchases. Escrowed and
    /// rejected contributions are not counted.
    #[pallet::storage]
    #[pallet::getter(fn funds_raised)]
    pub type FundsRaised<T: Config> = StorageValue<_, BalanceOf<T>, ValueQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// A purchase was submitted and awaits the validator's decision
        ContributionRegistered {
            beneficiary: T::AccountId,
            tokens: u128,
            nonce: u64,
            contribution: BalanceOf<T>,
        },
        /// A pending mint settled: tokens minted, proceeds forwarded
        TokenPurchase {
            purchaser: T::AccountId,
            beneficiary: T::AccountId,
            contribution: BalanceOf<T>,
            tokens: u128,
        },
        /// A pending mint was discarded by the validator
        MintRejected {
            beneficiary: T::AccountId,
            contribution: BalanceOf<T>,
            tokens: u128,
            nonce: u64,
            reason: u8,
        },
        /// Validator role handed over
        NewValidatorSet { previous: Option<T::AccountId>, new_validator: T::AccountId },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Caller is not the validator
        NotValidator,
        /// Beneficiary fails the membership gate
        NotWhitelisted,
        /// Nonce does not reference a currently-pending entry
        UnknownNonce,
        /// Purchases must carry a positive contribution
        ZeroContribution,
        /// Current time is outside the [start, end] sale window
        SaleNotActive,
        /// No proceeds wallet is configured
        WalletNotSet,
        Overflow,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Submit a purchase on behalf of `beneficiary`. The contribution is
        /// escrowed in the sale account immediately; tokens are minted only
        /// once the validator approves.
        #[pallet::call_index(0)]
        #[pallet::weight(10_000)]
        pub fn buy_tokens(
            origin: OriginFor<T>,
            beneficiary: T::AccountId,
            value: BalanceOf<T>,
        ) -> DispatchResult {
            let purchaser = ensure_signed(origin)?;

            ensure!(!value.is_zero(), Error::<T>::ZeroContribution);
            let now = T::TimeProvider::now().as_secs();
            ensure!(
                now >= StartTime::<T>::get() && now <= EndTime::<T>::get(),
                Error::<T>::SaleNotActive
            );
            ensure!(T::Membership::contains(&beneficiary), Error::<T>::NotWhitelisted);

            let units: u128 = value.unique_saturated_into();
            let tokens = Rate::<T>::get().checked_mul(units).ok_or(Error::<T>::Overflow)?;

            T::Currency::transfer(
                &purchaser,
                &Self::account_id(),
                value,
                ExistenceRequirement::AllowDeath,
            )?;

            let nonce = CurrentMintNonce::<T>::get();
            PendingMints::<T>::insert(
                nonce,
                PendingMint { beneficiary: beneficiary.clone(), tokens, contribution: value },
            );
            CurrentMintNonce::<T>::put(nonce.saturating_add(1));

            Self::deposit_event(Event::ContributionRegistered {
                beneficiary,
                tokens,
                nonce,
                contribution: value,
            });
            Ok(())
        }

        /// Settle a pending mint: mint the recorded tokens to the beneficiary
        /// and forward the escrowed contribution to the wallet. Membership is
        /// re-checked; approval-time membership wins over the submission-time
        /// snapshot.
        #[pallet::call_index(1)]
        #[pallet::weight(10_000)]
        pub fn approve_mint(origin: OriginFor<T>, nonce: u64) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_validator(&who)?;

            let entry = PendingMints::<T>::get(nonce).ok_or(Error::<T>::UnknownNonce)?;
            ensure!(T::Membership::contains(&entry.beneficiary), Error::<T>::NotWhitelisted);
            let wallet = Wallet::<T>::get().ok_or(Error::<T>::WalletNotSet)?;

            // The entry leaves the ledger before the mint and payout run;
            // the storage layer ties all three together so a failed side
            // effect also restores the entry.
            frame_support::storage::with_storage_layer::<(), DispatchError, _>(|| {
                PendingMints::<T>::remove(nonce);
                T::Token::mint_from(&Self::account_id(), &entry.beneficiary, entry.tokens)?;
                T::Currency::transfer(
                    &Self::account_id(),
                    &wallet,
                    entry.contribution,
                    ExistenceRequirement::AllowDeath,
                )?;
                Ok(())
            })?;

            FundsRaised::<T>::mutate(|raised| *raised = raised.saturating_add(entry.contribution));

            log::debug!(
                target: "runtime::compliant-crowdsale",
                "pending mint {} settled ({} tokens)",
                nonce,
                entry.tokens,
            );

            Self::deposit_event(Event::TokenPurchase {
                purchaser: who,
                beneficiary: entry.beneficiary,
                contribution: entry.contribution,
                tokens: entry.tokens,
            });
            Ok(())
        }

        /// Discard a pending mint. No tokens are minted; the escrowed
        /// contribution stays in the sale account for an external refund
        /// path.
        #[pallet::call_index(2)]
        #[pallet::weight(10_000)]
        pub fn reject_mint(origin: OriginFor<T>, nonce: u64, reason: u8) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_validator(&who)?;

            let entry = PendingMints::<T>::get(nonce).ok_or(Error::<T>::UnknownNonce)?;
            PendingMints::<T>::remove(nonce);

            log::debug!(
                target: "runtime::compliant-crowdsale",
                "pending mint {} rejected (reason: {})",
                nonce,
                reason,
            );

            Self::deposit_event(Event::MintRejected {
                beneficiary: entry.beneficiary,
                contribution: entry.contribution,
                tokens: entry.tokens,
                nonce,
                reason,
            });
            Ok(())
        }

        /// Hand the validator role to another account. Only the current
        /// validator may do this.
        #[pallet::call_index(3)]
        #[pallet::weight(10_000)]
        pub fn set_new_validator(origin: OriginFor<T>, new_validator: T::AccountId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_validator(&who)?;

            let previous = Validator::<T>::get();
            Validator::<T>::put(&new_validator);
            Self::deposit_event(Event::NewValidatorSet { previous, new_validator });
            Ok(())
        }

        /// Reassign the token's mint authority away from the sale account,
        /// e.g. back to a treasury once the sale concludes.
        #[pallet::call_index(4)]
        #[pallet::weight(10_000)]
        pub fn transfer_token_ownership(
            origin: OriginFor<T>,
            new_owner: T::AccountId,
        ) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            T::Token::transfer_issuer(&Self::account_id(), new_owner)
        }
    }

    impl<T: Config> Pallet<T> {
        /// The sale's sovereign account: escrow for contributions and holder
        /// of the token's mint authority.
        pub fn account_id() -> T::AccountId {
            T::PalletId::get().into_account_truncating()
        }

        fn ensure_validator(who: &T::AccountId) -> DispatchResult {
            ensure!(Validator::<T>::get().as_ref() == Some(who), Error::<T>::NotValidator);
            Ok(())
        }
    }

    #[pallet::genesis_config]
    #[derive(frame_support::DefaultNoBound)]
    pub struct GenesisConfig<T: Config> {
        /// Tokens minted per unit of contribution
        pub rate: u128,
        /// Destination for settled proceeds
        pub wallet: Option<T::AccountId>,
        /// Sale window start, unix seconds (inclusive)
        pub start_time: u64,
        /// Sale window end, unix seconds (inclusive)
        pub end_time: u64,
        /// Initial validator
        pub validator: Option<T::AccountId>,
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            Rate::<T>::put(self.rate);
            if let Some(ref wallet) = self.wallet {
                Wallet::<T>::put(wallet);
            }
            StartTime::<T>::put(self.start_time);
            EndTime::<T>::put(self.end_time);
            if let Some(ref validator) = self.validator {
                Validator::<T>::put(validator);
            }
        }
    }
}
