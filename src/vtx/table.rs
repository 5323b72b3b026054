//! # Frequency Code Table
//!
//! The set of frequencies the SteadyView X module supports and the device
//! code it wants for each one, with nearest-frequency lookup.

use crate::error::{Result, VtxBridgeError};

/// SteadyView X band data: (frequency in MHz, device code).
///
/// Band grouping is informational only; at runtime only the flat mapping
/// matters. The R-band 5880 MHz slot collides with F8 and is left out.
const STEADYVIEW_X_ENTRIES: [(u16, u8); 55] = [
    // Band A
    (5865, 0),
    (5845, 1),
    (5825, 2),
    (5805, 3),
    (5785, 4),
    (5765, 5),
    (5745, 6),
    (5725, 7),
    // Band B
    (5733, 8),
    (5752, 9),
    (5771, 10),
    (5790, 11),
    (5809, 12),
    (5828, 13),
    (5847, 14),
    (5866, 15),
    // Band E
    (5705, 16),
    (5685, 17),
    (5665, 18),
    (5645, 19),
    (5885, 20),
    (5905, 21),
    (5925, 22),
    (5945, 23),
    // Band F
    (5740, 24),
    (5760, 25),
    (5780, 26),
    (5800, 27),
    (5820, 28),
    (5840, 29),
    (5860, 30),
    (5880, 31),
    // Band R
    (5658, 32),
    (5695, 33),
    (5732, 34),
    (5769, 35),
    (5806, 36),
    (5843, 37),
    (5917, 39),
    // Band L
    (5362, 40),
    (5399, 41),
    (5436, 42),
    (5473, 43),
    (5510, 44),
    (5547, 45),
    (5584, 46),
    (5621, 47),
    // Band X
    (4990, 48),
    (5020, 49),
    (5050, 50),
    (5080, 51),
    (5110, 52),
    (5140, 53),
    (5170, 54),
    (5200, 55),
];

/// Immutable frequency-to-device-code mapping with nearest lookup.
///
/// Built once at startup and validated there: an empty or duplicated table
/// is a configuration error, not something to discover mid-flight. Entries
/// are held sorted ascending by frequency so lookup order, and therefore
/// tie-breaking, is deterministic.
///
/// # Examples
///
/// ```
/// use vtx_bridge::vtx::table::FrequencyTable;
///
/// let table = FrequencyTable::steadyview_x()?;
/// assert_eq!(table.code(5865), Some(0));
/// assert_eq!(table.nearest(5726), 5725);
/// # Ok::<(), vtx_bridge::error::VtxBridgeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    /// Entries sorted ascending by frequency
    entries: Vec<(u16, u8)>,
}

impl FrequencyTable {
    /// Builds the table for the SteadyView X module.
    ///
    /// # Errors
    ///
    /// Returns error if the built-in band data is invalid (caught at
    /// startup, should never happen for the shipped constants)
    pub fn steadyview_x() -> Result<Self> {
        Self::from_entries(&STEADYVIEW_X_ENTRIES)
    }

    /// Builds a table from (frequency, code) pairs in any order.
    ///
    /// # Arguments
    ///
    /// * `entries` - Pairs of supported frequency (MHz) and device code
    ///
    /// # Errors
    ///
    /// Returns error if `entries` is empty or contains a duplicate frequency
    pub fn from_entries(entries: &[(u16, u8)]) -> Result<Self> {
        if entries.is_empty() {
            return Err(VtxBridgeError::FrequencyTable(
                "frequency table must not be empty".to_string(),
            ));
        }

        let mut sorted = entries.to_vec();
        sorted.sort_unstable_by_key(|&(frequency, _)| frequency);

        for window in sorted.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(VtxBridgeError::FrequencyTable(format!(
                    "duplicate frequency {} MHz",
                    window[0].0
                )));
            }
        }

        Ok(Self { entries: sorted })
    }

    /// Returns the supported frequency numerically closest to `desired_mhz`.
    ///
    /// Linear scan keeping the running minimum absolute difference; a
    /// candidate replaces the best only on a strictly smaller difference,
    /// so an exact tie keeps the lower frequency (ascending scan order).
    #[must_use]
    pub fn nearest(&self, desired_mhz: u16) -> u16 {
        self.nearest_entry(desired_mhz).0
    }

    /// Returns the device code for an exactly supported frequency.
    #[must_use]
    pub fn code(&self, frequency_mhz: u16) -> Option<u8> {
        self.entries
            .binary_search_by_key(&frequency_mhz, |&(frequency, _)| frequency)
            .ok()
            .map(|index| self.entries[index].1)
    }

    /// Resolves `desired_mhz` to the nearest supported frequency and its code.
    #[must_use]
    pub fn code_for_nearest(&self, desired_mhz: u16) -> (u16, u8) {
        self.nearest_entry(desired_mhz)
    }

    /// Number of supported frequencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn nearest_entry(&self, desired_mhz: u16) -> (u16, u8) {
        // Non-empty is a construction invariant
        let mut best = self.entries[0];
        let mut min_diff = (i32::from(best.0) - i32::from(desired_mhz)).abs();

        for &(frequency, code) in &self.entries {
            let diff = (i32::from(frequency) - i32::from(desired_mhz)).abs();
            if diff < min_diff {
                min_diff = diff;
                best = (frequency, code);
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steadyview_x_table_size() {
        let table = FrequencyTable::steadyview_x().unwrap();
        assert_eq!(table.len(), 55);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_known_codes() {
        let table = FrequencyTable::steadyview_x().unwrap();

        assert_eq!(table.code(5865), Some(0)); // A1
        assert_eq!(table.code(5725), Some(7)); // A8
        assert_eq!(table.code(5880), Some(31)); // F8
        assert_eq!(table.code(5917), Some(39)); // R8
        assert_eq!(table.code(5200), Some(55)); // X8
        assert_eq!(table.code(5999), None);
    }

    #[test]
    fn test_nearest_is_idempotent_for_members() {
        let table = FrequencyTable::steadyview_x().unwrap();

        for &(frequency, code) in STEADYVIEW_X_ENTRIES.iter() {
            assert_eq!(table.nearest(frequency), frequency);
            assert_eq!(table.code_for_nearest(frequency), (frequency, code));
        }
    }

    #[test]
    fn test_nearest_picks_closest() {
        let table = FrequencyTable::steadyview_x().unwrap();

        assert_eq!(table.nearest(5726), 5725);
        assert_eq!(table.nearest(5000), 4990); // 10 away vs 5020 at 20
        assert_eq!(table.nearest(4000), 4990); // below the whole table
        assert_eq!(table.nearest(6000), 5945); // above the whole table
    }

    #[test]
    fn test_nearest_tie_break_keeps_lower_frequency() {
        let table = FrequencyTable::steadyview_x().unwrap();

        // 5005 is exactly between X1 (4990) and X2 (5020)
        assert_eq!(table.nearest(5005), 4990);

        // Same rule on a custom table
        let custom = FrequencyTable::from_entries(&[(100, 1), (200, 2)]).unwrap();
        assert_eq!(custom.nearest(150), 100);
    }

    #[test]
    fn test_from_entries_sorts_input() {
        let table = FrequencyTable::from_entries(&[(200, 2), (100, 1)]).unwrap();
        assert_eq!(table.nearest(149), 100);
        assert_eq!(table.nearest(151), 200);
        assert_eq!(table.code(100), Some(1));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let result = FrequencyTable::from_entries(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_frequency_is_rejected() {
        let result = FrequencyTable::from_entries(&[(5880, 31), (5880, 38)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_policy_outputs_are_exact_members() {
        use crate::vtx::policy::select_frequency;

        let table = FrequencyTable::steadyview_x().unwrap();

        for value in [0u16, 1050, 1150, 1280, 1400, 1500, 1700, 2047] {
            let desired = select_frequency(value);
            assert_eq!(table.nearest(desired), desired);
        }
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<u8> = STEADYVIEW_X_ENTRIES.iter().map(|&(_, code)| code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), STEADYVIEW_X_ENTRIES.len());
    }
}
