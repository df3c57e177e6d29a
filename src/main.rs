use std::process::ExitCode;

use poultrygeist::scene::{self, SceneId, SceneManager};
use poultrygeist::{AssetLoader, FileAssetLoader, HeadlessPipeline, RenderContext, RuntimeConfig};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional config path as the only argument
    let config = match std::env::args().nth(1) {
        Some(path) => match RuntimeConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("failed to load `{}`: {}", path, err);
                return ExitCode::FAILURE;
            }
        },
        None => RuntimeConfig::default(),
    };

    let assets: Box<dyn AssetLoader> = match &config.assets.root {
        Some(root) => Box::new(FileAssetLoader::new(root.clone(), config.assets.quality)),
        None => {
            log::info!("no asset root configured, using bundled placeholders");
            Box::new(scene::bundled_asset_loader(config.assets.quality))
        }
    };

    let mut manager = SceneManager::new(
        scene::standard_catalog(&config),
        RenderContext::new(Box::new(HeadlessPipeline::new())),
        assets,
        Box::new(scene::intro_motion(&config.intro)),
        config.camera.clone(),
    );
    if let Err(err) = manager.load_scene(SceneId::Menu) {
        log::error!("failed to load the menu: {}", err);
        return ExitCode::FAILURE;
    }

    match poultrygeist::run(config.window, config.bindings, manager) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event loop failed: {}", err);
            ExitCode::FAILURE
        }
    }
}
