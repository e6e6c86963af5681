//! # amount-converter
//!
//! The amount model behind a wallet's "enter amount" screens: one number
//! typed in either the native coin or a fiat currency, with the other side
//! kept in step.
//!
//! ## Native units are the truth
//!
//! A [`MonetaryAmount`] stores the native amount as an integer count of the
//! smallest unit (duffs, 10^-8 DASH). Its fiat value is derived from that
//! count and an [`ExchangeRate`](rates::ExchangeRate) whenever the value is
//! built, and never stored on its own. Switching the edited side re-derives
//! the fiat side from native units, so the two numbers cannot drift.
//!
//! ```rust,ignore
//! let converter = AmountConverter::default();
//! let rate = cache.rate("USD");
//!
//! let amount = converter.from_native_string("2.5", rate.as_ref(), "USD")?;
//! assert_eq!(amount.native_units(), 250_000_000);
//!
//! let fiat_side = converter.swap_active_side(&amount, ActiveSide::Fiat, rate.as_ref());
//! assert_eq!(converter.to_fiat_string(&fiat_side).as_deref(), Some("125.00"));
//! ```
//!
//! ## Errors are typed and local
//!
//! Parsing fails with a [`ParseError`]: malformed input, too many fractional
//! digits, no rate for fiat entry, or more than the maximum supply.
//! Bounds checks return a [`ValidationResult`]. Nothing here retries or does
//! I/O.
//!
//! ## Flows
//!
//! Send, CrowdNode and custodial-card flows differ only in which
//! [`AmountPolicy`](policy::AmountPolicy) they plug into an
//! [`AmountSession`], the stateful wrapper a screen owns for as long as it is
//! presented.
//!
//! ## Rounding
//!
//! Every rounding step is half up (`MidpointAwayFromZero`).
pub mod amount;
pub mod converter;
pub mod currency;
pub mod error;
pub mod format;
pub mod input;
pub mod policy;
pub mod session;
pub mod validation;

pub use amount::{ActiveSide, MonetaryAmount};
pub use converter::{AmountConverter, ConverterConfig, ExcessPrecision};
pub use currency::{Currency, DUFFS, MAX_DECIMALS, MAX_MONEY, NATIVE_CODE, NATIVE_DECIMALS};
pub use error::ParseError;
pub use format::NumberFormat;
pub use input::InputKey;
pub use policy::{AmountIssue, AmountPolicy, AmountWarning, PolicyVerdict};
pub use session::{AmountSession, AmountSnapshot, SessionState};
pub use validation::{ValidationBounds, ValidationResult, validate};

pub use rates;
