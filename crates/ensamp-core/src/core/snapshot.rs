//! The canonical in-memory mirror of one walker's physical state.
//!
//! A [`Snapshot`] is the single source of truth exchanged between an external
//! engine and every registered sampling method: the engine's adapter fills it
//! at the start of an integration cycle, listeners read it and bias its forces
//! in place, and the adapter translates the result back into engine commands.

use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Errors raised while synchronizing engine state into a snapshot.
///
/// Both variants are fatal: repairing mismatched arrays or guessing an unknown
/// species would silently corrupt the simulated physics.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SnapshotError {
    /// The engine reported per-particle arrays of disagreeing lengths.
    #[error(
        "inconsistent engine state: {positions} positions, {forces} forces, {species} species"
    )]
    LengthMismatch {
        positions: usize,
        forces: usize,
        species: usize,
    },

    /// A species identifier is absent from the table built at setup time.
    #[error("unknown species '{name}' ({known} species registered)")]
    UnknownSpecies { name: String, known: usize },
}

/// The unique-species table mapping a species identifier to its mass.
///
/// Built once from engine metadata before the run starts; per-particle species
/// entries in the snapshot are indices into this table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesTable {
    names: Vec<String>,
    masses: Vec<f64>,
}

impl SpeciesTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a species and returns its index.
    ///
    /// Re-registering an existing name updates its mass and returns the
    /// original index, so adapters can rebuild the table idempotently during
    /// setup.
    pub fn insert(&mut self, name: impl Into<String>, mass: f64) -> usize {
        let name = name.into();
        if let Some(index) = self.index_of(&name) {
            self.masses[index] = mass;
            return index;
        }
        self.names.push(name);
        self.masses.push(mass);
        self.names.len() - 1
    }

    /// Looks up the index of a species identifier.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Resolves a species identifier, failing if it was never registered.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnknownSpecies`]; the table is fixed at setup
    /// time and is not refreshed per step, so an unknown identifier means the
    /// adapter's setup is inconsistent with the engine.
    pub fn resolve(&self, name: &str) -> Result<usize, SnapshotError> {
        self.index_of(name).ok_or_else(|| SnapshotError::UnknownSpecies {
            name: name.to_string(),
            known: self.len(),
        })
    }

    /// Returns the mass of a species by index.
    pub fn mass(&self, index: usize) -> Option<f64> {
        self.masses.get(index).copied()
    }

    /// Returns the identifier of a species by index.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Returns the number of registered species.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no species are registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over `(identifier, mass)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.masses.iter().copied())
    }
}

/// The shared, mutable representation of the current physical system state.
///
/// Positions, forces, and species are index-aligned per particle, and the
/// length invariant across the three arrays is enforced at every bulk update:
/// mutable access hands out slices, so listeners can bias forces in place but
/// can never desynchronize the array lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    positions: Vec<Vector3<f64>>,
    forces: Vec<Vector3<f64>>,
    species: Vec<usize>,
    cell: Matrix3<f64>,
    timestep: f64,
    iteration: u64,
    species_table: SpeciesTable,
}

impl Snapshot {
    /// Creates an empty snapshot owning a prebuilt species table.
    pub fn new(species_table: SpeciesTable) -> Self {
        Self {
            positions: Vec::new(),
            forces: Vec::new(),
            species: Vec::new(),
            cell: Matrix3::zeros(),
            timestep: 0.0,
            iteration: 0,
            species_table,
        }
    }

    /// Returns the species table built at setup time.
    pub fn species_table(&self) -> &SpeciesTable {
        &self.species_table
    }

    /// Returns the number of particles.
    pub fn n_particles(&self) -> usize {
        self.positions.len()
    }

    /// Returns the per-particle positions.
    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    /// Returns the per-particle positions for in-place mutation.
    pub fn positions_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.positions
    }

    /// Returns the per-particle forces.
    pub fn forces(&self) -> &[Vector3<f64>] {
        &self.forces
    }

    /// Returns the per-particle forces for in-place mutation.
    ///
    /// This is how sampling methods apply bias: additions compose across
    /// listeners within one dispatch cycle.
    pub fn forces_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.forces
    }

    /// Returns the per-particle species indices into the species table.
    pub fn species(&self) -> &[usize] {
        &self.species
    }

    /// Returns the mass of one particle via the species table.
    pub fn mass_of(&self, particle: usize) -> Option<f64> {
        self.species
            .get(particle)
            .and_then(|&s| self.species_table.mass(s))
    }

    /// Returns the box geometry (one lattice vector per row).
    pub fn cell(&self) -> &Matrix3<f64> {
        &self.cell
    }

    /// Sets the box geometry.
    pub fn set_cell(&mut self, cell: Matrix3<f64>) {
        self.cell = cell;
    }

    /// Returns the integration timestep.
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    /// Sets the integration timestep.
    pub fn set_timestep(&mut self, timestep: f64) {
        self.timestep = timestep;
    }

    /// Returns the current integration step count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Sets the current integration step count.
    pub fn set_iteration(&mut self, iteration: u64) {
        self.iteration = iteration;
    }

    /// Replaces all per-particle arrays in one validated step.
    ///
    /// This is the entry point adapters use during engine-to-snapshot
    /// synchronization; it is the only way to change the particle count.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::LengthMismatch`] if the three arrays disagree
    /// in length. The snapshot is left untouched on failure; no truncation or
    /// padding is ever attempted.
    pub fn update(
        &mut self,
        positions: Vec<Vector3<f64>>,
        forces: Vec<Vector3<f64>>,
        species: Vec<usize>,
    ) -> Result<(), SnapshotError> {
        if positions.len() != forces.len() || positions.len() != species.len() {
            return Err(SnapshotError::LengthMismatch {
                positions: positions.len(),
                forces: forces.len(),
                species: species.len(),
            });
        }
        self.positions = positions;
        self.forces = forces;
        self.species = species;
        Ok(())
    }

    /// Re-checks the per-particle length invariant.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::LengthMismatch`] if an adapter desynchronized
    /// the arrays through a non-standard code path.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.positions.len() != self.forces.len() || self.positions.len() != self.species.len()
        {
            return Err(SnapshotError::LengthMismatch {
                positions: self.positions.len(),
                forces: self.forces.len(),
                species: self.species.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water_table() -> SpeciesTable {
        let mut table = SpeciesTable::new();
        table.insert("O", 15.999);
        table.insert("H", 1.008);
        table
    }

    #[test]
    fn species_table_resolves_registered_names() {
        let table = water_table();
        assert_eq!(table.resolve("O").unwrap(), 0);
        assert_eq!(table.resolve("H").unwrap(), 1);
        assert_eq!(table.mass(1), Some(1.008));
        assert_eq!(table.name(0), Some("O"));
    }

    #[test]
    fn unknown_species_is_a_fatal_lookup_error() {
        let table = water_table();
        assert_eq!(
            table.resolve("Xe"),
            Err(SnapshotError::UnknownSpecies {
                name: "Xe".to_string(),
                known: 2,
            })
        );
    }

    #[test]
    fn reinserting_a_species_keeps_its_index() {
        let mut table = water_table();
        assert_eq!(table.insert("O", 16.0), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.mass(0), Some(16.0));
    }

    #[test]
    fn update_replaces_all_arrays_atomically() {
        let mut snapshot = Snapshot::new(water_table());
        snapshot
            .update(
                vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)],
                vec![Vector3::zeros(), Vector3::zeros()],
                vec![0, 1],
            )
            .unwrap();

        assert_eq!(snapshot.n_particles(), 2);
        assert_eq!(snapshot.mass_of(0), Some(15.999));
        assert_eq!(snapshot.mass_of(1), Some(1.008));
        snapshot.validate().unwrap();
    }

    #[test]
    fn update_rejects_mismatched_array_lengths() {
        let mut snapshot = Snapshot::new(water_table());
        let result = snapshot.update(
            vec![Vector3::zeros(), Vector3::zeros()],
            vec![Vector3::zeros()],
            vec![0, 1],
        );
        assert_eq!(
            result,
            Err(SnapshotError::LengthMismatch {
                positions: 2,
                forces: 1,
                species: 2,
            })
        );
        // The failed update must not have touched the snapshot.
        assert_eq!(snapshot.n_particles(), 0);
    }

    #[test]
    fn forces_are_mutable_in_place_without_resizing() {
        let mut snapshot = Snapshot::new(water_table());
        snapshot
            .update(
                vec![Vector3::zeros()],
                vec![Vector3::new(1.0, 0.0, 0.0)],
                vec![0],
            )
            .unwrap();

        snapshot.forces_mut()[0] += Vector3::new(0.0, 2.0, 0.0);
        assert_eq!(snapshot.forces()[0], Vector3::new(1.0, 2.0, 0.0));
    }
}
