use std::collections::{BTreeMap, BTreeSet};

/// Commit counts keyed by `(YYYY-MM-DD, hour)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heatmap {
    buckets: BTreeMap<(String, u8), u32>,
}

fn is_date_shaped(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Split a `date hour` line. Anything else is `None`.
pub fn parse_stamp(line: &str) -> Option<(&str, u8)> {
    let mut tokens = line.split_whitespace();
    let date = tokens.next()?;
    let hour = tokens.next()?;
    if tokens.next().is_some() || !is_date_shaped(date) {
        return None;
    }
    if hour.is_empty() || hour.len() > 2 || !hour.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u8 = hour.parse().ok()?;
    (hour < 24).then_some((date, hour))
}

impl Heatmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket every well-formed line; malformed and blank lines are dropped.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut heatmap = Self::new();
        let mut skipped = 0usize;
        for line in lines {
            match parse_stamp(line.as_ref()) {
                Some((date, hour)) => heatmap.record(date, hour),
                None if line.as_ref().trim().is_empty() => {}
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            log::debug!("ignored {skipped} malformed timestamp lines");
        }
        heatmap
    }

    /// Count one commit; hours outside 0-23 are ignored.
    pub fn record(&mut self, date: &str, hour: u8) {
        if hour > 23 {
            log::debug!("ignored out-of-range hour {hour} on {date}");
            return;
        }
        *self.buckets.entry((date.to_string(), hour)).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn count(&self, date: &str, hour: u8) -> u32 {
        self.buckets
            .get(&(date.to_string(), hour))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.buckets.values().map(|&c| c as u64).sum()
    }

    /// Buckets in date then hour order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u8, u32)> + '_ {
        self.buckets
            .iter()
            .map(|((date, hour), &count)| (date.as_str(), *hour, count))
    }

    pub fn dates(&self) -> BTreeSet<&str> {
        self.buckets.keys().map(|(date, _)| date.as_str()).collect()
    }

    pub fn hour_totals(&self) -> [u64; 24] {
        let mut totals = [0u64; 24];
        for (_, hour, count) in self.iter() {
            totals[hour as usize] += count as u64;
        }
        totals
    }

    /// `"YYYY-MM-DD-HH" -> count`, the shape clients consume.
    pub fn keyed(&self) -> BTreeMap<String, u32> {
        self.iter()
            .map(|(date, hour, count)| (format!("{date}-{hour:02}"), count))
            .collect()
    }
}
