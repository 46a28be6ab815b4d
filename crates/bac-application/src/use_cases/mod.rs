//! Use Cases
//!
//! | Use case | Description |
//! |----------|-------------|
//! | [`BridgingResolver`] | Memoized join/lookup pipeline over any [`Bridge`] |
//! | [`FilterDefinitionBridge`] | Hypotheses to filter definitions by usage |
//! | [`ChannelSegmentWaveformIds`] | Channel segments to legacy waveform ids |

pub mod bridging;
pub mod filter_definitions;
pub mod lookup;
pub mod waveform_ids;

pub use bridging::{Bridge, BridgeTable, BridgingResolver, JoinRecord};
pub use filter_definitions::{
    FilterDefinitionBridge, FilterDefinitionStores, filter_definition_resolver,
};
pub use lookup::fetch_partitioned;
pub use waveform_ids::{ChannelSegmentWaveformIds, ChannelSegmentWaveformStore};
