mod framework;
mod earth_app;

use std::process::ExitCode;

use crate::{
    earth_app::{config::SceneConfig, define_renderer, define_updater, init_scene},
    framework::application::{self, ApplicationDescriptor, RunParams},
};

fn main() -> ExitCode {
    env_logger::init();

    // session summary is reported when the block ends, on both exit paths
    let result = {
        profiler::session_begin!("earth-scene");
        run()
    };
    exit_code(result)
}

fn run() -> anyhow::Result<()> {
    let config = SceneConfig::from_env()?;
    let params = RunParams {
        window_name:   config.window.title.clone(),
        window_width:  config.window.width,
        window_height: config.window.height,
    };

    pollster::block_on(application::run(
        ApplicationDescriptor {
            init_renderer: |context: &application::Context| define_renderer(context, config.camera.exposure),
            init_updater:  define_updater,
            init_scene:    |context: &application::Context| init_scene(context, &config),
        },
        params,
    ))
}

fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            crate::error!("{:?}", err);
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(code: ExitCode) -> String {
        format!("{:?}", code)
    }

    #[test]
    fn failed_run_ends_with_failure_code() {
        assert_eq!(code(exit_code(Ok(()))), code(ExitCode::SUCCESS));
        assert_eq!(code(exit_code(Err(anyhow::anyhow!("no adapter")))), code(ExitCode::FAILURE));
    }
}
