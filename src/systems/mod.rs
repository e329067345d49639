pub mod click;
pub mod drag;
pub mod hover;
pub mod view_transform;

use click::ClickDisambiguator;
use drag::DragController;
use hover::HoverTracker;
use log::info;
use view_transform::{ViewTransformCoordinator, ViewTransformSettings};

use crate::engine_config::EngineConfig;

pub struct Systems {
    pub hover_tracker: HoverTracker,
    pub click_disambiguator: ClickDisambiguator,
    pub drag_controller: DragController,
    pub view_transform: ViewTransformCoordinator,
}

impl Systems {
    pub fn new(config: &EngineConfig) -> Systems {
        let hover_tracker = HoverTracker::new(config.area_grid_size);

        let click_disambiguator = ClickDisambiguator::new(config.click_window_ms);

        let view_transform = ViewTransformCoordinator::new(ViewTransformSettings {
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            handoff_threshold: config.handoff_threshold_px,
        });

        info!(
            "Gesture systems ready; click window {}ms, scale range [{}, {}]",
            config.click_window_ms, config.min_scale, config.max_scale
        );

        Systems {
            hover_tracker,
            click_disambiguator,
            drag_controller: DragController::new(),
            view_transform,
        }
    }
}
