pub mod magics;
pub mod movegen;
pub mod tables;

use std::sync::LazyLock;

/// Force every lazily built attack table. The tables are immutable after
/// this and freely shared; calling it again is a no-op. The UCI loop
/// runs it on the first `isready`, before any search can start.
pub fn initialize() {
    LazyLock::force(&tables::KNIGHT_ATTACKS);
    LazyLock::force(&tables::KING_ATTACKS);
    LazyLock::force(&tables::WPAWN_ATTACKS);
    LazyLock::force(&tables::BPAWN_ATTACKS);
    LazyLock::force(&tables::BISHOP_RM);
    LazyLock::force(&tables::ROOK_RM);
    LazyLock::force(&magics::SLIDING_ATTACKS);
}
