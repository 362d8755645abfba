//! Lineup catalog and the caller's device selection.

use std::collections::BTreeSet;

use thiserror::Error;

/// Number of subfeed breakers fitted to every PDU.
pub const SUBFEEDS_PER_PDU: usize = 8;

/// Default number of PDUs per lineup.
pub const DEFAULT_PDUS_PER_LINEUP: usize = 2;

/// Errors raised by selection edits that name a device the catalog lacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("unknown lineup \"{0}\"")]
    UnknownLineup(String),
    #[error("lineup \"{lineup}\" has no PDU index {index} (PDUs per lineup: {count})")]
    PduOutOfRange {
        lineup: String,
        index: usize,
        count: usize,
    },
    #[error("lineup \"{lineup}\" PDU index {pdu} has no subfeed index {index}")]
    SubfeedOutOfRange {
        lineup: String,
        pdu: usize,
        index: usize,
    },
}

/// A PDU and the subfeed breakers metered on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    /// Zero-based position within the lineup.
    pub index: usize,
    /// Activation flag per subfeed breaker.
    pub subfeeds: [bool; SUBFEEDS_PER_PDU],
}

impl Pdu {
    fn new(index: usize) -> Self {
        Self {
            index,
            subfeeds: [false; SUBFEEDS_PER_PDU],
        }
    }

    /// Number of active subfeed breakers.
    pub fn active_subfeed_count(&self) -> usize {
        self.subfeeds.iter().filter(|&&on| on).count()
    }

    /// Indices of active subfeed breakers in ascending order.
    pub fn active_subfeeds(&self) -> impl Iterator<Item = usize> + '_ {
        self.subfeeds
            .iter()
            .enumerate()
            .filter_map(|(i, &on)| on.then_some(i))
    }
}

/// A lineup from the catalog together with its selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineup {
    /// Catalog identifier (e.g. `"A01"`).
    pub id: String,
    /// Whether the lineup takes part in allocation.
    pub selected: bool,
    /// PDUs in use. `None` means every PDU of the lineup.
    pub pdu_selection: Option<BTreeSet<usize>>,
    /// All PDUs fitted to the lineup, by index.
    pub pdus: Vec<Pdu>,
}

impl Lineup {
    fn new(id: &str, pdus_per_lineup: usize) -> Self {
        Self {
            id: id.to_string(),
            selected: false,
            pdu_selection: None,
            pdus: (0..pdus_per_lineup).map(Pdu::new).collect(),
        }
    }

    /// Returns the PDU indices in use, ascending, resolving the default.
    pub fn active_pdu_indices(&self) -> Vec<usize> {
        match &self.pdu_selection {
            Some(set) => set.iter().copied().filter(|&i| i < self.pdus.len()).collect(),
            None => (0..self.pdus.len()).collect(),
        }
    }

    /// Returns the PDUs in use, ascending by index.
    pub fn active_pdus(&self) -> impl Iterator<Item = &Pdu> + '_ {
        self.active_pdu_indices()
            .into_iter()
            .filter_map(|i| self.pdus.get(i))
    }
}

/// The lineup catalog in catalog order, plus the current selection.
///
/// Selection edits take `&mut self`; the resolver only ever borrows the value,
/// so each planning call sees one consistent snapshot.
///
/// # Examples
///
/// ```
/// use lineup_planner::plan::topology::Topology;
///
/// let mut topo = Topology::from_catalog(&["A01", "A02"], 2);
/// topo.toggle_lineup("A01").unwrap();
/// assert_eq!(topo.active_pdu_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    lineups: Vec<Lineup>,
}

impl Topology {
    /// Creates a topology with every catalog lineup present and unselected.
    pub fn from_catalog<S: AsRef<str>>(catalog: &[S], pdus_per_lineup: usize) -> Self {
        Self {
            lineups: catalog
                .iter()
                .map(|id| Lineup::new(id.as_ref(), pdus_per_lineup))
                .collect(),
        }
    }

    /// Builder variant of [`Topology::set_lineup_selected`] for several ids.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownLineup`] for an id not in the catalog.
    pub fn with_selected<S: AsRef<str>>(mut self, ids: &[S]) -> Result<Self, TopologyError> {
        for id in ids {
            self.set_lineup_selected(id.as_ref(), true)?;
        }
        Ok(self)
    }

    /// All lineups in catalog order.
    pub fn lineups(&self) -> &[Lineup] {
        &self.lineups
    }

    /// Selected lineups in catalog order.
    pub fn selected_lineups(&self) -> impl Iterator<Item = &Lineup> + '_ {
        self.lineups.iter().filter(|l| l.selected)
    }

    /// Number of PDUs in use across all selected lineups.
    pub fn active_pdu_count(&self) -> usize {
        self.selected_lineups()
            .map(|l| l.active_pdu_indices().len())
            .sum()
    }

    /// Looks up a lineup by id.
    pub fn lineup(&self, id: &str) -> Option<&Lineup> {
        self.lineups.iter().find(|l| l.id == id)
    }

    fn lineup_mut(&mut self, id: &str) -> Result<&mut Lineup, TopologyError> {
        self.lineups
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| TopologyError::UnknownLineup(id.to_string()))
    }

    fn pdu_mut(&mut self, id: &str, pdu: usize) -> Result<&mut Pdu, TopologyError> {
        let lineup = self.lineup_mut(id)?;
        let count = lineup.pdus.len();
        lineup
            .pdus
            .get_mut(pdu)
            .ok_or_else(|| TopologyError::PduOutOfRange {
                lineup: id.to_string(),
                index: pdu,
                count,
            })
    }

    /// Flips whether a lineup is selected.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownLineup`] for an id not in the catalog.
    pub fn toggle_lineup(&mut self, id: &str) -> Result<(), TopologyError> {
        let lineup = self.lineup_mut(id)?;
        lineup.selected = !lineup.selected;
        Ok(())
    }

    /// Selects or deselects a lineup.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownLineup`] for an id not in the catalog.
    pub fn set_lineup_selected(&mut self, id: &str, selected: bool) -> Result<(), TopologyError> {
        self.lineup_mut(id)?.selected = selected;
        Ok(())
    }

    /// Adds or removes one PDU from a lineup's selection.
    ///
    /// Starts from the effective selection, so toggling a PDU of a lineup with
    /// the default selection removes it from "all PDUs".
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown lineup or a PDU index out of range.
    pub fn toggle_pdu(&mut self, id: &str, pdu: usize) -> Result<(), TopologyError> {
        self.pdu_mut(id, pdu)?;
        let lineup = self.lineup_mut(id)?;
        let mut current: BTreeSet<usize> = lineup.active_pdu_indices().into_iter().collect();
        if !current.remove(&pdu) {
            current.insert(pdu);
        }
        lineup.pdu_selection = Some(current);
        Ok(())
    }

    /// Replaces a lineup's PDU selection. `None` restores the default.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown lineup or any PDU index out of range.
    pub fn set_pdu_selection(
        &mut self,
        id: &str,
        pdus: Option<&[usize]>,
    ) -> Result<(), TopologyError> {
        if let Some(indices) = pdus {
            for &i in indices {
                self.pdu_mut(id, i)?;
            }
        }
        let lineup = self.lineup_mut(id)?;
        lineup.pdu_selection = pdus.map(|indices| indices.iter().copied().collect());
        Ok(())
    }

    /// Flips one subfeed breaker of a PDU.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown lineup, PDU, or subfeed index.
    pub fn toggle_subfeed(
        &mut self,
        id: &str,
        pdu: usize,
        subfeed: usize,
    ) -> Result<(), TopologyError> {
        let slot = self.subfeed_mut(id, pdu, subfeed)?;
        *slot = !*slot;
        Ok(())
    }

    /// Sets exactly the listed subfeeds of a PDU active.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown lineup, PDU, or subfeed index.
    pub fn set_subfeeds(
        &mut self,
        id: &str,
        pdu: usize,
        active: &[usize],
    ) -> Result<(), TopologyError> {
        for &s in active {
            self.subfeed_mut(id, pdu, s)?;
        }
        let device = self.pdu_mut(id, pdu)?;
        device.subfeeds = [false; SUBFEEDS_PER_PDU];
        for &s in active {
            device.subfeeds[s] = true;
        }
        Ok(())
    }

    fn subfeed_mut(
        &mut self,
        id: &str,
        pdu: usize,
        subfeed: usize,
    ) -> Result<&mut bool, TopologyError> {
        let device = self.pdu_mut(id, pdu)?;
        device
            .subfeeds
            .get_mut(subfeed)
            .ok_or_else(|| TopologyError::SubfeedOutOfRange {
                lineup: id.to_string(),
                pdu,
                index: subfeed,
            })
    }

    /// Deselects every lineup and resets PDU and subfeed selections.
    pub fn clear(&mut self) {
        for lineup in &mut self.lineups {
            lineup.selected = false;
            lineup.pdu_selection = None;
            for pdu in &mut lineup.pdus {
                pdu.subfeeds = [false; SUBFEEDS_PER_PDU];
            }
        }
    }
}
