//! The reward-points rule engine.
//!
//! Scores are the sum of seven independent, additive rules. The rules
//! are evaluated in a fixed order and the computation aborts on the
//! first field that does not parse, so a malformed receipt always
//! reports the same failure no matter which other fields are broken.

use super::store::Receipt;
use crate::error::{Error, Result, ScoreField};

/// Computes the reward-points score for a receipt.
///
/// The receipt is only borrowed for the duration of the call; caching
/// the result is the caller's concern.
///
/// # Errors
///
/// Returns [`Error::UnscoreableReceipt`] naming the first field (in
/// rule order) that fails to parse: the total, an item price, the
/// purchase time, or the purchase date.
pub fn calculate(receipt: &Receipt) -> Result<u64> {
	let mut points: u64 = 0;

	// one point for every alphanumeric character in the retailer name
	for c in receipt.retailer.chars() {
		if c.is_alphanumeric() {
			points += 1;
		}
	}

	let total = parse_cents(&receipt.total)
		.ok_or(Error::UnscoreableReceipt(ScoreField::Total))?;

	// 50 points for a round dollar amount with no cents
	if total % 100 == 0 {
		points += 50;
	}

	// 25 points for a multiple of 0.25, independently of the above
	if total % 25 == 0 {
		points += 25;
	}

	// five points for every complete pair of items
	points += 5 * (receipt.items.len() / 2) as u64;

	// ceil(price * 0.2) points for every item whose trimmed
	// description length is a multiple of three; zero qualifies, so a
	// blank description earns the bonus too
	for item in &receipt.items {
		if item.short_description.trim().len() % 3 == 0 {
			let price = parse_cents(&item.price).ok_or(
				Error::UnscoreableReceipt(ScoreField::ItemPrice),
			)?;
			points += price / 500 + u64::from(price % 500 != 0);
		}
	}

	// ten points for a purchase in [14:00, 16:00)
	let hour = parse_hour(&receipt.purchase_time).ok_or(
		Error::UnscoreableReceipt(ScoreField::PurchaseTime),
	)?;
	if hour == 14 || hour == 15 {
		points += 10;
	}

	// six points for an odd day of month
	let day = parse_day(&receipt.purchase_date).ok_or(
		Error::UnscoreableReceipt(ScoreField::PurchaseDate),
	)?;
	if day % 2 == 1 {
		points += 6;
	}

	Ok(points)
}

/// Parses a non-negative decimal money string with at most two
/// fractional digits into whole cents. Integer cents keep the
/// round-dollar, quarter-multiple and ceiling arithmetic exact.
fn parse_cents(value: &str) -> Option<u64> {
	let (dollars, fraction) = match value.split_once('.') {
		Some((dollars, fraction)) => (dollars, fraction),
		None => (value, ""),
	};

	if dollars.is_empty() && fraction.is_empty() {
		return None;
	}
	if !dollars.bytes().all(|b| b.is_ascii_digit())
		|| !fraction.bytes().all(|b| b.is_ascii_digit())
		|| fraction.len() > 2
	{
		return None;
	}

	let whole: u64 = if dollars.is_empty() {
		0
	} else {
		dollars.parse().ok()?
	};
	let cents: u64 = match fraction.len() {
		0 => 0,
		1 => fraction.parse::<u64>().ok()? * 10,
		_ => fraction.parse().ok()?,
	};

	whole.checked_mul(100)?.checked_add(cents)
}

/// Hour from the fixed "HH:MM" layout, chars 0-2.
fn parse_hour(time: &str) -> Option<u32> {
	time.get(0..2)?.parse().ok()
}

/// Day of month from the fixed "YYYY-MM-DD" layout, chars 8-10.
fn parse_day(date: &str) -> Option<u32> {
	date.get(8..10)?.parse().ok()
}
