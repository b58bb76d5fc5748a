// ---------- Tune-ables ---------- //
pub const D_MODEL: usize = 128;  // width of the latent vector each board row is embedded into
pub const NHEAD: usize = 8;  // attention heads per encoder layer
pub const NUM_LAYERS: usize = 2;  // stacked self-attention blocks
pub const D_FF: usize = 2048;  // feed-forward width inside each encoder layer
pub const DROPOUT: f64 = 0.1;  // only active while training
pub const VALUE_HIDDEN: usize = 128;  // hidden width of the value head
pub const L2_CONST: f32 = 1e-4;  // coef of l2 penalty (applied as Adam weight decay)

// ---------- Basic types (renamed for pretty) ---------- //
pub type Action = usize;  // index into the flattened (row-major) cell space
pub type Probability = f32;
pub type Reward = f32;
pub type LearningRate = burn::LearningRate;

// ---------- Traits the board must provide ----------
/// What the network needs to know about a board to evaluate it.
///
/// `current_state` is row-major: `board_height` rows of `board_width` features each.
pub trait Board {
    fn current_state(&self) -> Vec<f32>;
    /// Legal cell indices in `[0, board_width * board_height)`
    fn availables(&self) -> Vec<Action>;
}

/// A board already reduced to raw planes, for callers that don't carry a game object around
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub state: Vec<f32>,
    pub availables: Vec<Action>,
}

impl BoardSnapshot {
    pub fn new(state: Vec<f32>, availables: Vec<Action>) -> Self {
        Self { state, availables }
    }

    /// All-zero planes with every cell legal
    pub fn empty(board_width: usize, board_height: usize) -> Self {
        let cells = board_width * board_height;
        Self::new(vec![0.0; cells], (0..cells).collect())
    }
}

impl Board for BoardSnapshot {
    fn current_state(&self) -> Vec<f32> {
        self.state.clone()
    }

    fn availables(&self) -> Vec<Action> {
        self.availables.clone()
    }
}
