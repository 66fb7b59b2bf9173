//! Renderer contract
//!
//! The core does not draw. Each frame it flattens the simulation into plain
//! `Pod` instance arrays that a GPU pipeline uploads as-is with
//! `bytemuck::cast_slice`. Layouts must match the shader side.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::dice::MAX_PIPS;
use crate::hand::HandRank;
use crate::sim::{DieMode, GameState, Rect};

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub world: [f32; 2],      // offset 0
    pub rock_tile_size: f32,  // offset 8
    pub die_size: f32,        // offset 12
    pub roll_zone: [f32; 4],  // offset 16 - x, y, w, h
    pub score_zone: [f32; 4], // offset 32
    pub die_count: u32,       // offset 48
    pub buffer_count: u32,    // offset 52
    pub rock_count: u32,      // offset 56
    pub best_hand: u32,       // offset 60 - HandRank discriminant
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DieInstance {
    pub pos: [f32; 2],       // offset 0
    pub vel: [f32; 2],       // offset 8
    pub direction: [f32; 2], // offset 16
    pub color: [f32; 4],     // offset 24 - rgb + lift (jump height)
    pub z_rotation: f32,     // offset 40
    pub mode: u32,           // offset 44 - 0 rolling, 1 held, 2 drag, 3 scoring
    pub active_face: u32,    // offset 48
    pub face_count: u32,     // offset 52
    /// One word per face: 2 bits per 3x3 cell (0 empty, 1 plain, 2 double, 3 hollow)
    pub pips: [u32; MAX_PIPS], // offset 56
    _pad: u32,                 // pad to 96 bytes
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RockInstance {
    pub pos: [f32; 2],
    pub sprite_slope: [u32; 2],
    pub sprite_index: u32,
    pub size: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BufferUniform {
    pub target_color: [f32; 4],
    pub source_color: [f32; 4],
    /// Remaining blend, 1.0 = all source, 0.0 = all target
    pub transition: f32,
    /// First rock of this buffer in the rock instance array
    pub rock_offset: u32,
    pub rock_count: u32,
    /// 0 base, 1 held, 2 transition
    pub family: u32,
}

fn rect_array(r: &Rect) -> [f32; 4] {
    [r.x, r.y, r.w, r.h]
}

fn color_array(c: Vec3, w: f32) -> [f32; 4] {
    [c.x, c.y, c.z, w]
}

fn mode_code(mode: DieMode) -> u32 {
    match mode {
        DieMode::Rolling => 0,
        DieMode::Held => 1,
        DieMode::Drag => 2,
        DieMode::Scoring => 3,
    }
}

/// Pack a face's 3x3 cell codes into one word
pub fn pack_pips(cells: &[u8; MAX_PIPS]) -> u32 {
    cells
        .iter()
        .enumerate()
        .fold(0, |bits, (i, &code)| bits | (u32::from(code & 0b11) << (2 * i)))
}

/// Per-frame view of the simulation. Vectors are reused across frames, so
/// steady-state capture does not allocate.
#[derive(Debug, Clone, Default)]
pub struct RenderSnapshot {
    pub globals: Globals,
    pub dice: Vec<DieInstance>,
    pub rocks: Vec<RockInstance>,
    pub buffers: Vec<BufferUniform>,
    pub best_hand: HandRank,
}

impl RenderSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refill from `state`
    pub fn capture(&mut self, state: &GameState) {
        let ctx = state.ctx();
        let tile = ctx.rock_tile_size();
        let frames = ctx.color_transition_frames();

        self.dice.clear();
        for die in &state.dice {
            let mut pips = [0u32; MAX_PIPS];
            for (slot, cells) in pips.iter_mut().zip(die.model.pip_matrix()) {
                *slot = pack_pips(&cells);
            }
            let direction = die.direction.vector();
            self.dice.push(DieInstance {
                pos: die.pos.to_array(),
                vel: die.vel.to_array(),
                direction: direction.to_array(),
                color: color_array(die.color.rgb(), die.height),
                z_rotation: die.z_rotation,
                mode: mode_code(die.mode),
                active_face: die.model.active_face_index() as u32,
                face_count: die.model.faces().len() as u32,
                pips,
                _pad: 0,
            });
        }

        self.rocks.clear();
        self.buffers.clear();
        for (family, buffer) in state.rocks.buffers() {
            self.buffers.push(BufferUniform {
                target_color: color_array(buffer.target_color, 1.0),
                source_color: color_array(buffer.source_color, 1.0),
                transition: buffer.transition_fraction(frames),
                rock_offset: self.rocks.len() as u32,
                rock_count: buffer.len() as u32,
                family: family as u32,
            });
            self.rocks.extend(buffer.rocks.iter().map(|rock| {
                let (sx, sy) = rock.sprite_slope();
                RockInstance {
                    pos: rock.pos.to_array(),
                    sprite_slope: [u32::from(sx), u32::from(sy)],
                    sprite_index: u32::from(rock.sprite_index()),
                    size: rock.size(tile),
                }
            }));
        }

        self.best_hand = state.level.best_hand;
        self.globals = Globals {
            world: [ctx.world.w, ctx.world.h],
            rock_tile_size: tile,
            die_size: ctx.die_size(),
            roll_zone: rect_array(&ctx.roll_zone),
            score_zone: rect_array(&ctx.score_zone),
            die_count: self.dice.len() as u32,
            buffer_count: self.buffers.len() as u32,
            rock_count: self.rocks.len() as u32,
            best_hand: self.best_hand as u32,
        };
    }

    /// HUD text for the held hand
    pub fn best_hand_name(&self) -> &'static str {
        self.best_hand.name()
    }

    pub fn globals_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.globals)
    }

    pub fn dice_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.dice)
    }

    pub fn rock_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.rocks)
    }

    pub fn buffer_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.buffers)
    }
}
