#![cfg_attr(not(feature = "std"), no_std)]
// Allow deprecated weight constants for MVP (will be replaced by benchmarks post-grant)
#![allow(deprecated)]

use frame_support::{dispatch::DispatchResult, ensure, pallet_prelude::*, traits::Contains};
use frame_system::{ensure_signed, pallet_prelude::*};
use sp_std::prelude::*;

pub use pallet::*;

#[cfg(test)]
mod mock;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

/// The current storage version.
const STORAGE_VERSION: StorageVersion = StorageVersion::new(1);

/// A transfer recorded at submission time, awaiting the validator's decision.
///
/// `fee` is the amount that will actually be charged on settlement. It is
/// fixed when the entry is created: a transfer whose sender is the configured
/// fee recipient is recorded with a zero fee, locking in the exemption even if
/// the fee or recipient changes while the entry is pending.
#[derive(Clone, PartialEq, Eq, Encode, Decode, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct PendingTransfer<AccountId> {
    pub from: AccountId,
    pub to: AccountId,
    pub value: u128,
    pub fee: u128,
    /// `None` for self-initiated transfers, the delegated caller otherwise.
    pub spender: Option<AccountId>,
}

/// Issuance surface of the token, consumed by the crowdsale pallet.
///
/// `issuer` must match the token's stored owner; the crowdsale passes its
/// sovereign account here, mirroring a sale that owns the token it sells.
pub trait TokenIssuance<AccountId> {
    fn mint_from(issuer: &AccountId, to: &AccountId, amount: u128) -> DispatchResult;
    fn transfer_issuer(current: &AccountId, new: AccountId) -> DispatchResult;
}

/// Lets benchmarks register accounts with the runtime's membership oracle,
/// which this pallet can otherwise only read.
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
    fn add_member(account: &AccountId);
}

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;
        /// Membership oracle: answers whether an account may send or receive.
        /// Consulted at submission and again at settlement, never mutated here.
        type Membership: Contains<Self::AccountId>;
        #[cfg(feature = "runtime-benchmarks")]
        type BenchmarkHelper: BenchmarkHelper<Self::AccountId>;
    }

    #[pallet::pallet]
    #[pallet::storage_version(STORAGE_VERSION)]
    pub struct Pallet<T>(_);

    /// Token name (e.g., "Compliant Security Token")
    #[pallet::storage]
    #[pallet::getter(fn token_name)]
    pub type TokenName<T> = StorageValue<_, BoundedVec<u8, ConstU32<64>>, ValueQuery>;

    /// Token symbol (e.g., "CST")
    #[pallet::storage]
    #[pallet::getter(fn token_symbol)]
    pub type TokenSymbol<T> = StorageValue<_, BoundedVec<u8, ConstU32<16>>, ValueQuery>;

    /// Token decimals (display only)
    #[pallet::storage]
    #[pallet::getter(fn decimals)]
    pub type Decimals<T> = StorageValue<_, u8, ValueQuery>;

    /// Total token supply
    #[pallet::storage]
    #[pallet::getter(fn total_supply)]
    pub type TotalSupply<T> = StorageValue<_, u128, ValueQuery>;

    /// Account balances
    #[pallet::storage]
    #[pallet::getter(fn balance_of)]
    pub type Balances<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, u128, ValueQuery>;

    /// Delegated-transfer allowances: (owner, spender) -> remaining capacity.
    /// Set directly by the owner; consumed at submission time, not settlement.
    #[pallet::storage]
    #[pallet::getter(fn allowance)]
    pub type Allowances<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        T::AccountId,
        Blake2_128Concat,
        T::AccountId,
        u128,
        ValueQuery,
    >;

    /// Transfers awaiting the validator's decision, keyed by nonce.
    /// Absent means never submitted or already settled/rejected.
    #[pallet::storage]
    #[pallet::getter(fn pending_transaction)]
    pub type PendingTransfers<T: Config> =
        StorageMap<_, Blake2_128Concat, u64, PendingTransfer<T::AccountId>, OptionQuery>;

    /// Value+fee reserved against an owner's balance (spender = `None`) or an
    /// allowance (spender = `Some`) by outstanding pending transfers.
    #[pallet::storage]
    #[pallet::getter(fn pending_approval_amount)]
    pub type PendingApprovalAmounts<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        T::AccountId,
        Blake2_128Concat,
        Option<T::AccountId>,
        u128,
        ValueQuery,
    >;

    /// Next nonce to assign; nonces are assigned in commit order, starting at
    /// 0, never reused, never skipped.
    #[pallet::storage]
    #[pallet::getter(fn current_nonce)]
    pub type CurrentNonce<T> = StorageValue<_, u64, ValueQuery>;

    /// Flat fee charged on every settled transfer, unless the sender is the
    /// fee recipient.
    #[pallet::storage]
    #[pallet::getter(fn transfer_fee)]
    pub type TransferFee<T> = StorageValue<_, u128, ValueQuery>;

    /// Receiver of transfer fees; fee-exempt as a sender.
    #[pallet::storage]
    #[pallet::getter(fn fee_recipient)]
    pub type FeeRecipient<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    /// The single account allowed to settle or reject pending transfers and
    /// to change the fee configuration.
    #[pallet::storage]
    #[pallet::getter(fn validator)]
    pub type Validator<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    /// Mint authority. Held by the crowdsale's sovereign account while the
    /// sale runs.
    #[pallet::storage]
    #[pallet::getter(fn owner)]
    pub type Owner<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// A transfer was submitted and awaits the validator's decision
        RecordedPendingTransaction {
            from: T::AccountId,
            to: T::AccountId,
            value: u128,
            fee: u128,
            spender: Option<T::AccountId>,
            nonce: u64,
        },
        /// A pending transfer settled: `value` moved from `from` to `to`
        Transfer { from: T::AccountId, to: T::AccountId, value: u128 },
        /// The fee portion of a settled transfer, paid to the fee recipient
        TransferWithFee { from: T::AccountId, to: T::AccountId, value: u128, fee: u128 },
        /// A pending transfer was discarded by the validator
        TransferRejected {
            from: T::AccountId,
            to: T::AccountId,
            value: u128,
            nonce: u64,
            reason: u8,
        },
        /// An owner set a spender's allowance
        Approval { owner: T::AccountId, spender: T::AccountId, value: u128 },
        /// New tokens minted
        Minted { to: T::AccountId, amount: u128 },
        /// Transfer fee changed
        FeeSet { previous: u128, new: u128 },
        /// Fee recipient changed
        FeeRecipientSet { previous: Option<T::AccountId>, new: T::AccountId },
        /// Validator role handed over
        NewValidatorSet { previous: Option<T::AccountId>, new_validator: T::AccountId },
        /// Mint authority handed over
        OwnershipTransferred { previous: Option<T::AccountId>, new_owner: T::AccountId },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Caller is not the validator
        NotValidator,
        /// Caller is not the mint authority
        NotOwner,
        /// A party fails the membership gate
        NotWhitelisted,
        /// Nonce does not reference a currently-pending entry
        UnknownNonce,
        /// Balance net of reservations cannot cover value plus fee
        InsufficientBalance,
        /// Remaining allowance cannot cover value plus fee
        InsufficientAllowance,
        /// A fee is due but no fee recipient is configured
        FeeRecipientNotSet,
        Overflow,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Submit a self-initiated transfer. Settles only once the validator
        /// approves it; until then `value + fee` is reserved against the
        /// sender's balance.
        #[pallet::call_index(0)]
        #[pallet::weight(10_000)]
        pub fn transfer(origin: OriginFor<T>, to: T::AccountId, value: u128) -> DispatchResult {
            let from = ensure_signed(origin)?;
            Self::queue_transfer(from, to, value, None)
        }

        /// Submit a delegated transfer out of `from`'s balance. The caller's
        /// allowance must cover `value + fee` and is consumed immediately, so
        /// a spender cannot double-commit capacity across pending entries.
        #[pallet::call_index(1)]
        #[pallet::weight(10_000)]
        pub fn transfer_from(
            origin: OriginFor<T>,
            from: T::AccountId,
            to: T::AccountId,
            value: u128,
        ) -> DispatchResult {
            let spender = ensure_signed(origin)?;
            Self::queue_transfer(from, to, value, Some(spender))
        }

        /// Set (not adjust) the caller's allowance for `spender`.
        #[pallet::call_index(2)]
        #[pallet::weight(10_000)]
        pub fn approve_spender(
            origin: OriginFor<T>,
            spender: T::AccountId,
            value: u128,
        ) -> DispatchResult {
            let owner = ensure_signed(origin)?;
            if value == 0 {
                Allowances::<T>::remove(&owner, &spender);
            } else {
                Allowances::<T>::insert(&owner, &spender, value);
            }
            Self::deposit_event(Event::Approval { owner, spender, value });
            Ok(())
        }

        /// Settle a pending transfer. Both parties are re-checked against the
        /// membership gate; approval-time membership wins over the
        /// submission-time snapshot.
        #[pallet::call_index(3)]
        #[pallet::weight(10_000)]
        pub fn approve_transfer(origin: OriginFor<T>, nonce: u64) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_validator(&who)?;

            let entry = PendingTransfers::<T>::get(nonce).ok_or(Error::<T>::UnknownNonce)?;
            ensure!(T::Membership::contains(&entry.from), Error::<T>::NotWhitelisted);
            ensure!(T::Membership::contains(&entry.to), Error::<T>::NotWhitelisted);

            let total = entry.value.checked_add(entry.fee).ok_or(Error::<T>::Overflow)?;

            // Balance moves commit together or not at all; the layer keeps
            // partially applied credits out of storage when a later step
            // fails.
            frame_support::storage::with_storage_layer::<(), DispatchError, _>(|| {
                Balances::<T>::try_mutate(&entry.from, |balance| -> DispatchResult {
                    *balance = balance.checked_sub(total).ok_or(Error::<T>::InsufficientBalance)?;
                    Ok(())
                })?;
                Balances::<T>::try_mutate(&entry.to, |balance| -> DispatchResult {
                    *balance = balance.checked_add(entry.value).ok_or(Error::<T>::Overflow)?;
                    Ok(())
                })?;
                if entry.fee > 0 {
                    let recipient =
                        FeeRecipient::<T>::get().ok_or(Error::<T>::FeeRecipientNotSet)?;
                    Balances::<T>::try_mutate(&recipient, |balance| -> DispatchResult {
                        *balance = balance.checked_add(entry.fee).ok_or(Error::<T>::Overflow)?;
                        Ok(())
                    })?;
                }
                Ok(())
            })?;

            Self::release_reservation(&entry.from, &entry.spender, total);
            PendingTransfers::<T>::remove(nonce);

            log::debug!(
                target: "runtime::compliant-token",
                "pending transfer {} settled (fee: {})",
                nonce,
                entry.fee,
            );

            Self::deposit_event(Event::Transfer {
                from: entry.from.clone(),
                to: entry.to.clone(),
                value: entry.value,
            });
            if entry.fee > 0 {
                Self::deposit_event(Event::TransferWithFee {
                    from: entry.from,
                    to: entry.to,
                    value: entry.value,
                    fee: entry.fee,
                });
            }
            Ok(())
        }

        /// Discard a pending transfer, releasing its reservation. Allowance
        /// already consumed at submission is not restored: a rejected
        /// delegated transfer needs a fresh grant before resubmission.
        #[pallet::call_index(4)]
        #[pallet::weight(10_000)]
        pub fn reject_transfer(origin: OriginFor<T>, nonce: u64, reason: u8) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_validator(&who)?;

            let entry = PendingTransfers::<T>::get(nonce).ok_or(Error::<T>::UnknownNonce)?;
            let total = entry.value.checked_add(entry.fee).ok_or(Error::<T>::Overflow)?;

            Self::release_reservation(&entry.from, &entry.spender, total);
            PendingTransfers::<T>::remove(nonce);

            log::debug!(
                target: "runtime::compliant-token",
                "pending transfer {} rejected (reason: {})",
                nonce,
                reason,
            );

            Self::deposit_event(Event::TransferRejected {
                from: entry.from,
                to: entry.to,
                value: entry.value,
                nonce,
                reason,
            });
            Ok(())
        }

        /// Change the transfer fee. Entries already pending keep the fee they
        /// were recorded with.
        #[pallet::call_index(5)]
        #[pallet::weight(10_000)]
        pub fn set_fee(origin: OriginFor<T>, fee: u128) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_validator(&who)?;

            let previous = TransferFee::<T>::get();
            TransferFee::<T>::put(fee);
            Self::deposit_event(Event::FeeSet { previous, new: fee });
            Ok(())
        }

        /// Change the fee recipient (the fee-exempt party).
        #[pallet::call_index(6)]
        #[pallet::weight(10_000)]
        pub fn set_fee_recipient(origin: OriginFor<T>, recipient: T::AccountId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_validator(&who)?;

            let previous = FeeRecipient::<T>::get();
            FeeRecipient::<T>::put(&recipient);
            Self::deposit_event(Event::FeeRecipientSet { previous, new: recipient });
            Ok(())
        }

        /// Hand the validator role to another account. Only the current
        /// validator may do this; the argument is a real account by
        /// construction, so the role can never be handed into a void.
        #[pallet::call_index(7)]
        #[pallet::weight(10_000)]
        pub fn set_new_validator(origin: OriginFor<T>, new_validator: T::AccountId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_validator(&who)?;

            let previous = Validator::<T>::get();
            Validator::<T>::put(&new_validator);
            Self::deposit_event(Event::NewValidatorSet { previous, new_validator });
            Ok(())
        }

        /// Mint new tokens. Restricted to the owner (the crowdsale while the
        /// sale runs).
        #[pallet::call_index(8)]
        #[pallet::weight(10_000)]
        pub fn mint(origin: OriginFor<T>, to: T::AccountId, amount: u128) -> DispatchResult {
            let who = ensure_signed(origin)?;
            ensure!(Owner::<T>::get().as_ref() == Some(&who), Error::<T>::NotOwner);
            Self::do_mint(&to, amount)
        }

        /// Hand the mint authority to another account.
        #[pallet::call_index(9)]
        #[pallet::weight(10_000)]
        pub fn transfer_ownership(origin: OriginFor<T>, new_owner: T::AccountId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            ensure!(Owner::<T>::get().as_ref() == Some(&who), Error::<T>::NotOwner);
            Self::set_owner(new_owner);
            Ok(())
        }
    }

    impl<T: Config> Pallet<T> {
        fn ensure_validator(who: &T::AccountId) -> DispatchResult {
            ensure!(Validator::<T>::get().as_ref() == Some(who), Error::<T>::NotValidator);
            Ok(())
        }

        /// Fee that will be charged for a transfer submitted now by `from`.
        /// Zero when `from` is the fee recipient (payer-based exemption) or
        /// when no recipient is configured to receive a fee.
        fn effective_fee(from: &T::AccountId) -> u128 {
            match FeeRecipient::<T>::get() {
                Some(ref recipient) if recipient != from => TransferFee::<T>::get(),
                _ => 0,
            }
        }

        /// Record a pending transfer and reserve its value+fee. Shared by the
        /// self-initiated and delegated submission paths.
        fn queue_transfer(
            from: T::AccountId,
            to: T::AccountId,
            value: u128,
            spender: Option<T::AccountId>,
        ) -> DispatchResult {
            ensure!(T::Membership::contains(&from), Error::<T>::NotWhitelisted);
            ensure!(T::Membership::contains(&to), Error::<T>::NotWhitelisted);

            let fee = Self::effective_fee(&from);
            let total = value.checked_add(fee).ok_or(Error::<T>::Overflow)?;

            match spender.as_ref() {
                Some(delegate) => {
                    // Consumed now, not at settlement, so capacity cannot be
                    // committed twice across pending submissions.
                    let remaining = Allowances::<T>::get(&from, delegate)
                        .checked_sub(total)
                        .ok_or(Error::<T>::InsufficientAllowance)?;
                    if remaining == 0 {
                        Allowances::<T>::remove(&from, delegate);
                    } else {
                        Allowances::<T>::insert(&from, delegate, remaining);
                    }
                }
                None => {
                    let reserved = PendingApprovalAmounts::<T>::get(&from, &None::<T::AccountId>);
                    let required = total.checked_add(reserved).ok_or(Error::<T>::Overflow)?;
                    ensure!(
                        required <= Balances::<T>::get(&from),
                        Error::<T>::InsufficientBalance
                    );
                }
            }

            PendingApprovalAmounts::<T>::try_mutate(&from, &spender, |reserved| -> DispatchResult {
                *reserved = reserved.checked_add(total).ok_or(Error::<T>::Overflow)?;
                Ok(())
            })?;

            let nonce = CurrentNonce::<T>::get();
            PendingTransfers::<T>::insert(
                nonce,
                PendingTransfer {
                    from: from.clone(),
                    to: to.clone(),
                    value,
                    fee,
                    spender: spender.clone(),
                },
            );
            CurrentNonce::<T>::put(nonce.saturating_add(1));

            Self::deposit_event(Event::RecordedPendingTransaction {
                from,
                to,
                value,
                fee,
                spender,
                nonce,
            });
            Ok(())
        }

        /// Release a reservation after settlement or rejection, clearing the
        /// storage entry once it reaches zero.
        fn release_reservation(
            owner: &T::AccountId,
            spender: &Option<T::AccountId>,
            total: u128,
        ) {
            PendingApprovalAmounts::<T>::mutate_exists(owner, spender, |maybe| {
                let next = maybe.unwrap_or_default().saturating_sub(total);
                *maybe = if next == 0 { None } else { Some(next) };
            });
        }

        pub(crate) fn do_mint(to: &T::AccountId, amount: u128) -> DispatchResult {
            let new_supply =
                TotalSupply::<T>::get().checked_add(amount).ok_or(Error::<T>::Overflow)?;
            let new_balance =
                Balances::<T>::get(to).checked_add(amount).ok_or(Error::<T>::Overflow)?;

            TotalSupply::<T>::put(new_supply);
            Balances::<T>::insert(to, new_balance);

            Self::deposit_event(Event::Minted { to: to.clone(), amount });
            Ok(())
        }

        pub(crate) fn set_owner(new_owner: T::AccountId) {
            let previous = Owner::<T>::get();
            Owner::<T>::put(&new_owner);
            Self::deposit_event(Event::OwnershipTransferred { previous, new_owner });
        }
    }

    #[pallet::genesis_config]
    #[derive(frame_support::DefaultNoBound)]
    pub struct GenesisConfig<T: Config> {
        /// Token name
        pub token_name: Vec<u8>,
        /// Token symbol
        pub token_symbol: Vec<u8>,
        /// Token decimals
        pub decimals: u8,
        /// Initial mint authority
        pub owner: Option<T::AccountId>,
        /// Initial validator
        pub validator: Option<T::AccountId>,
        /// Initial transfer fee
        pub transfer_fee: u128,
        /// Initial fee recipient
        pub fee_recipient: Option<T::AccountId>,
        /// Initial token mints (account, amount)
        pub initial_balances: Vec<(T::AccountId, u128)>,
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            let name: BoundedVec<u8, ConstU32<64>> =
                self.token_name.clone().try_into().expect("Token name too long (max 64 bytes)");
            TokenName::<T>::put(name);

            let symbol: BoundedVec<u8, ConstU32<16>> =
                self.token_symbol.clone().try_into().expect("Token symbol too long (max 16 bytes)");
            TokenSymbol::<T>::put(symbol);

            Decimals::<T>::put(self.decimals);

            if let Some(ref owner) = self.owner {
                Owner::<T>::put(owner);
            }
            if let Some(ref validator) = self.validator {
                Validator::<T>::put(validator);
            }
            TransferFee::<T>::put(self.transfer_fee);
            if let Some(ref recipient) = self.fee_recipient {
                FeeRecipient::<T>::put(recipient);
            }

            let mut total: u128 = 0;
            for (account, amount) in &self.initial_balances {
                Balances::<T>::insert(account, amount);
                total = total.saturating_add(*amount);
            }
            TotalSupply::<T>::put(total);
        }
    }
}

impl<T: Config> TokenIssuance<T::AccountId> for Pallet<T> {
    fn mint_from(issuer: &T::AccountId, to: &T::AccountId, amount: u128) -> DispatchResult {
        ensure!(Owner::<T>::get().as_ref() == Some(issuer), Error::<T>::NotOwner);
        Self::do_mint(to, amount)
    }

    fn transfer_issuer(current: &T::AccountId, new: T::AccountId) -> DispatchResult {
        ensure!(Owner::<T>::get().as_ref() == Some(current), Error::<T>::NotOwner);
        Self::set_owner(new);
        Ok(())
    }
}
