//! Deterministic block placement.
//!
//! Every section becomes a column of equal width in [`SectionKind::ALL`]
//! order. Blocks stack downwards inside their column. All stacks share one
//! vertical center line, derived from the largest block count across every
//! section, so columns with fewer blocks line up with the top of the
//! tallest one.

use indexmap::IndexMap;
use log::{debug, trace};

use blockdraft_core::{
    geometry::{Bounds, Point, Size},
    model::{Block, Section},
};

use crate::config::LayoutConfig;

/// Drawn size of an annotation note.
pub const NOTE_SIZE: Size = Size::new(120.0, 40.0);

/// Position and size given to blocks the user inserts.
pub const INSERTED_BLOCK_ORIGIN: Point = Point::new(100.0, 100.0);
pub const INSERTED_BLOCK_SIZE: Size = Size::new(150.0, 60.0);

/// Position given to annotations the user inserts.
pub const INSERTED_NOTE_ORIGIN: Point = Point::new(200.0, 200.0);

/// A section as produced by a generator, plus per-block specification text
/// keyed by block name.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDraft {
    section: Section,
    specs: IndexMap<String, String>,
}

impl SectionDraft {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            specs: IndexMap::new(),
        }
    }

    pub fn with_specs(mut self, specs: IndexMap<String, String>) -> Self {
        self.specs = specs;
        self
    }

    pub fn section(&self) -> &Section {
        &self.section
    }

    pub fn spec_for(&self, block_name: &str) -> Option<&str> {
        self.specs.get(block_name).map(String::as_str)
    }

    pub fn into_section(self) -> Section {
        self.section
    }
}

/// Places blocks on the canvas.
#[derive(Debug, Clone)]
pub struct Engine {
    config: LayoutConfig,
}

impl Engine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Produces one block per section entry, in section then entry order.
    ///
    /// Generated ids are `block_<section>_<index>`. Output depends only on
    /// the section order, the block counts, and the configuration.
    pub fn place(&self, drafts: &[SectionDraft]) -> Vec<Block> {
        let config = &self.config;
        let max_blocks = drafts
            .iter()
            .map(|draft| draft.section().blocks().len())
            .max()
            .unwrap_or(0);
        let stack_top =
            config.canvas_height() / 2.0 - (max_blocks as f32 * config.block_pitch()) / 2.0;
        let size = Size::new(config.block_width(), config.block_height());

        debug!(max_blocks, stack_top; "Computed shared stack origin");

        let mut blocks = Vec::new();
        for draft in drafts {
            let kind = draft.section().kind();
            let x = config.section_x(kind) + config.section_padding() + config.block_inset();

            for (idx, name) in draft.section().blocks().iter().enumerate() {
                let top_left = Point::new(x, stack_top + idx as f32 * config.block_pitch());
                let mut block = Block::new(
                    format!("block_{kind}_{idx}"),
                    kind,
                    name,
                    Bounds::new_from_top_left(top_left, size),
                );
                if let Some(spec) = draft.spec_for(name) {
                    block = block.with_specification(spec);
                }
                trace!(block:?; "Placed block");
                blocks.push(block);
            }
        }
        blocks
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use blockdraft_core::model::SectionKind;

    use super::*;

    fn drafts(counts: [usize; 5]) -> Vec<SectionDraft> {
        SectionKind::ALL
            .into_iter()
            .zip(counts)
            .map(|(kind, count)| {
                let names = (0..count).map(|i| format!("{kind} {i}")).collect();
                SectionDraft::new(Section::new(kind, names, ""))
            })
            .collect()
    }

    #[test]
    fn test_single_block_per_section() {
        let blocks = Engine::new(LayoutConfig::default()).place(&drafts([1; 5]));
        assert_eq!(blocks.len(), 5);

        let first = &blocks[0];
        assert_eq!(first.id(), "block_power_0");
        assert_approx_eq!(f32, first.position().x(), 15.0);
        assert_approx_eq!(f32, first.position().y(), 399.0);
        assert_approx_eq!(f32, first.size().width(), 255.0);
        assert_approx_eq!(f32, first.size().height(), 90.0);

        let last = &blocks[4];
        assert_eq!(last.id(), "block_peripherals_0");
        assert_approx_eq!(f32, last.position().x(), 1135.0);
    }

    #[test]
    fn test_stacks_share_global_center() {
        let blocks = Engine::new(LayoutConfig::default()).place(&drafts([1, 4, 1, 2, 1]));
        // The tallest column has four blocks: 450 - 4 * 102 / 2 = 246.
        for block in &blocks {
            let idx: usize = block.id().rsplit('_').next().unwrap().parse().unwrap();
            assert_approx_eq!(f32, block.position().y(), 246.0 + idx as f32 * 102.0);
        }
    }

    #[test]
    fn test_specification_attached_by_name() {
        let mut specs = IndexMap::new();
        specs.insert("Camera".to_string(), "1080p, 30 fps".to_string());
        let draft = SectionDraft::new(Section::new(
            SectionKind::Inputs,
            vec!["Camera".into(), "Microphone".into()],
            "",
        ))
        .with_specs(specs);

        let blocks = Engine::new(LayoutConfig::default()).place(&[draft]);
        assert_eq!(blocks[0].specification(), Some("1080p, 30 fps"));
        assert_eq!(blocks[1].specification(), None);
    }

    #[test]
    fn test_long_names_truncated() {
        let draft = SectionDraft::new(Section::new(
            SectionKind::Peripherals,
            vec!["Very Long Communication Module".into()],
            "",
        ));
        let blocks = Engine::new(LayoutConfig::default()).place(&[draft]);
        assert_eq!(blocks[0].name(), "Very Long Communicat");
    }

    proptest! {
        #[test]
        fn placement_is_deterministic(counts in prop::array::uniform5(0usize..8)) {
            let engine = Engine::new(LayoutConfig::default());
            let first = engine.place(&drafts(counts));
            let second = engine.place(&drafts(counts));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn blocks_stay_in_their_column(counts in prop::array::uniform5(1usize..8)) {
            let config = LayoutConfig::default();
            let blocks = Engine::new(config.clone()).place(&drafts(counts));
            prop_assert_eq!(blocks.len(), counts.iter().sum::<usize>());
            for block in &blocks {
                let left = config.section_x(block.section_id());
                prop_assert!(block.position().x() >= left);
                prop_assert!(block.bounds().max_x() <= left + config.section_width());
            }
        }
    }
}
