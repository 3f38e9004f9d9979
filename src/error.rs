use thiserror::Error;

/// The receipt field that failed semantic validation while scoring.
///
/// Fields are shape-checked at submission only; whether they parse
/// into the numeric or temporal form the rules need is first checked
/// here, at scoring time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreField {
	Total,
	ItemPrice,
	PurchaseTime,
	PurchaseDate,
}

impl ScoreField {
	/// User-visible reason fragment for this field.
	#[must_use]
	pub const fn reason(self) -> &'static str {
		match self {
			Self::Total => "invalid total",
			Self::ItemPrice => "invalid item price(s)",
			Self::PurchaseTime => "invalid time of purchase",
			Self::PurchaseDate => "invalid date of purchase",
		}
	}
}

#[derive(Error, Debug)]
pub enum Error {
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	#[error("no receipt found for id: {0}")]
	ReceiptNotFound(String),

	#[error("unable to calculate points ({})", .0.reason())]
	UnscoreableReceipt(ScoreField),

	#[error("custom error: {0}")]
	Custom(String),
}

pub type Result<T> = std::result::Result<T, Error>;
