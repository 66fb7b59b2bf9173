//! Die faces and pips
//!
//! A face is a row of 1-9 pip slots. Its value is the pip count unless a
//! modifier on one of the slots says otherwise.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Most pips a face can carry (one per cell of the 3x3 grid)
pub const MAX_PIPS: usize = 9;

/// Special pip behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipModifier {
    /// Counts twice toward the face value
    Double,
    /// Drawn but worth nothing
    Hollow,
}

/// One pip slot on a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pip {
    pub modifier: Option<PipModifier>,
}

impl Pip {
    /// Contribution of this pip to the face value
    pub fn weight(&self) -> u8 {
        match self.modifier {
            None => 1,
            Some(PipModifier::Double) => 2,
            Some(PipModifier::Hollow) => 0,
        }
    }

    /// Cell code for the renderer's pip matrix
    fn cell_code(&self) -> u8 {
        match self.modifier {
            None => 1,
            Some(PipModifier::Double) => 2,
            Some(PipModifier::Hollow) => 3,
        }
    }
}

/// A single die face
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieFace {
    pips: Vec<Pip>,
}

impl DieFace {
    /// Face with `count` unmodified pips, clamped to 1..=MAX_PIPS
    pub fn plain(count: u8) -> Self {
        let count = (count as usize).clamp(1, MAX_PIPS);
        Self {
            pips: vec![Pip::default(); count],
        }
    }

    /// Builder: tag the pip in `slot` with a modifier (ignored if out of range)
    pub fn with_modifier(mut self, slot: usize, modifier: PipModifier) -> Self {
        if let Some(pip) = self.pips.get_mut(slot) {
            pip.modifier = Some(modifier);
        }
        self
    }

    pub fn pips(&self) -> &[Pip] {
        &self.pips
    }

    /// True number of pips, ignoring modifiers
    pub fn pip_count(&self) -> u8 {
        self.pips.len() as u8
    }

    /// Face value used for hands and scoring
    pub fn value(&self) -> u8 {
        self.pips.iter().map(Pip::weight).sum()
    }

    /// 3x3 grid occupancy: 0 empty, 1 plain, 2 double, 3 hollow
    pub fn layout(&self) -> [u8; MAX_PIPS] {
        let mut cells = [0u8; MAX_PIPS];
        for (pip, &cell) in self.pips.iter().zip(pip_layout(self.pip_count())) {
            cells[cell] = pip.cell_code();
        }
        cells
    }
}

/// Grid cells (row-major 3x3) occupied by a face with `count` pips
pub fn pip_layout(count: u8) -> &'static [usize] {
    match count {
        0 => &[],
        1 => &[4],
        2 => &[0, 8],
        3 => &[0, 4, 8],
        4 => &[0, 2, 6, 8],
        5 => &[0, 2, 4, 6, 8],
        6 => &[0, 2, 3, 5, 6, 8],
        7 => &[0, 2, 3, 4, 5, 6, 8],
        8 => &[0, 1, 2, 3, 5, 6, 7, 8],
        _ => &[0, 1, 2, 3, 4, 5, 6, 7, 8],
    }
}

/// The faces of one die plus which face is up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieModel {
    faces: Vec<DieFace>,
    active_face_index: usize,
}

impl DieModel {
    /// Standard die: faces showing 1..=faces_per_die pips
    pub fn standard(faces_per_die: u8) -> Self {
        let faces = (1..=faces_per_die.clamp(1, MAX_PIPS as u8))
            .map(DieFace::plain)
            .collect();
        Self {
            faces,
            active_face_index: 0,
        }
    }

    /// Custom die. An empty face list falls back to a single one-pip face.
    pub fn from_faces(faces: Vec<DieFace>) -> Self {
        let faces = if faces.is_empty() {
            vec![DieFace::plain(1)]
        } else {
            faces
        };
        Self {
            faces,
            active_face_index: 0,
        }
    }

    pub fn faces(&self) -> &[DieFace] {
        &self.faces
    }

    pub fn active_face_index(&self) -> usize {
        self.active_face_index
    }

    pub fn active_face(&self) -> &DieFace {
        &self.faces[self.active_face_index]
    }

    /// Show a specific face (index wraps around the face count)
    pub fn set_active_face(&mut self, index: usize) {
        self.active_face_index = index % self.faces.len();
    }

    /// Turn up a random face
    pub fn roll<R: Rng>(&mut self, rng: &mut R) {
        self.active_face_index = rng.random_range(0..self.faces.len());
    }

    /// Per-face 3x3 pip grid for the renderer
    pub fn pip_matrix(&self) -> impl Iterator<Item = [u8; MAX_PIPS]> + '_ {
        self.faces.iter().map(DieFace::layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_plain_face_value() {
        for n in 1..=9 {
            let face = DieFace::plain(n);
            assert_eq!(face.value(), n);
            assert_eq!(face.pip_count(), n);
        }
        assert_eq!(DieFace::plain(0).pip_count(), 1);
        assert_eq!(DieFace::plain(12).pip_count(), 9);
    }

    #[test]
    fn test_modifiers_override_value() {
        let face = DieFace::plain(3).with_modifier(0, PipModifier::Double);
        assert_eq!(face.value(), 4);
        assert_eq!(face.pip_count(), 3);

        let face = DieFace::plain(3).with_modifier(2, PipModifier::Hollow);
        assert_eq!(face.value(), 2);
        assert_eq!(face.pip_count(), 3);
    }

    #[test]
    fn test_layout_cells() {
        let face = DieFace::plain(5).with_modifier(2, PipModifier::Double);
        let cells = face.layout();
        assert_eq!(cells.iter().filter(|&&c| c != 0).count(), 5);
        assert_eq!(cells[4], 2);
        assert_eq!(cells[1], 0);
    }

    #[test]
    fn test_standard_model_and_roll() {
        let mut model = DieModel::standard(6);
        assert_eq!(model.faces().len(), 6);
        assert_eq!(model.pip_matrix().count(), 6);

        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            model.roll(&mut rng);
            let v = model.active_face().value();
            assert!((1..=6).contains(&v));
        }

        model.set_active_face(8);
        assert_eq!(model.active_face_index(), 2);
    }
}
