//! Domain Services
//!
//! Interfaces the owning domain services call. The canonical definitions
//! are in `crate::ports::services`.
//!
//! | Service | Description |
//! |---------|-------------|
//! | [`FilterDefinitionResolverInterface`] | Filter definitions by usage for hypotheses |
//! | [`ChannelSegmentWaveformIdsInterface`] | Legacy waveform ids behind channel segments |

pub use crate::ports::services::{
    ChannelSegmentWaveformIdsInterface, FilterDefinitionResolverInterface,
    FilterDefinitionsByUsage, WaveformIdsByChannelSegment,
};
