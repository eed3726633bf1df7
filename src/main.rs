use std::path::PathBuf;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use blob_city_gen::config::INITIAL_SEED;
use blob_city_gen::error::CityGenError;
use blob_city_gen::systems::city::orchestrator::CollisionScope;
use blob_city_gen::systems::city::profile::ProfileTable;
use blob_city_gen::systems::city::scene::SceneData;
use blob_city_gen::systems::city::scene::demo::demo_scene;
use blob_city_gen::systems::city::{CityGenerationPlugin, CityParams, Seed};

const USAGE: &str = "usage: city_gen [SCENE.json] [--seed N] [--profiles FILE] [--out FILE] [--roads FILE] [--scope region|city]";

// command line options
#[derive(Debug, Default)]
struct Options {
    scene: Option<PathBuf>,
    seed: Option<u64>,
    profiles: Option<PathBuf>,
    out: Option<PathBuf>,
    roads: Option<PathBuf>,
    scope: CollisionScope,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--seed" => {
                let raw = value("--seed")?;
                options.seed = Some(raw.parse().map_err(|_| format!("invalid seed '{raw}'"))?);
            }
            "--profiles" => options.profiles = Some(PathBuf::from(value("--profiles")?)),
            "--out" => options.out = Some(PathBuf::from(value("--out")?)),
            "--roads" => options.roads = Some(PathBuf::from(value("--roads")?)),
            "--scope" => {
                options.scope = match value("--scope")?.as_str() {
                    "region" => CollisionScope::Region,
                    "city" => CollisionScope::City,
                    other => return Err(format!("unknown scope '{other}'")),
                }
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("unknown option '{flag}'")),
            path if options.scene.is_none() => options.scene = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument '{extra}'")),
        }
    }

    Ok(options)
}

// loads the inputs the plugin runs on
fn prepare(options: &Options) -> Result<(Seed, CityParams, ProfileTable, SceneData), CityGenError> {
    let seed = Seed(options.seed.unwrap_or(INITIAL_SEED));

    let tables = match &options.profiles {
        Some(path) => ProfileTable::load(path)?,
        None => ProfileTable::default(),
    };

    let scene = match &options.scene {
        Some(path) => SceneData::load(path)?,
        None => demo_scene(seed.0, &tables),
    };

    let mut params = CityParams {
        scope: options.scope,
        roads_output: options.roads.clone(),
        export_on_startup: true,
        ..default()
    };
    if let Some(out) = &options.out {
        params.building_output = out.clone();
    }

    Ok((seed, params, tables, scene))
}

fn main() -> AppExit {
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            return AppExit::error();
        }
    };

    let (seed, params, tables, scene) = match prepare(&options) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("city_gen: {e}");
            return AppExit::error();
        }
    };

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_once()))
        .add_plugins(LogPlugin::default())
        .insert_resource(seed)
        .insert_resource(params)
        .insert_resource(tables)
        .insert_resource(scene)

        // my custom plugins
        .add_plugins(CityGenerationPlugin)
        .run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_all_options() {
        let options = parse_args(args(&[
            "scene.json", "--seed", "42", "--out", "b.json", "--roads", "r.json", "--scope", "city",
        ]))
        .unwrap();
        assert_eq!(options.scene, Some(PathBuf::from("scene.json")));
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.out, Some(PathBuf::from("b.json")));
        assert_eq!(options.roads, Some(PathBuf::from("r.json")));
        assert_eq!(options.scope, CollisionScope::City);
    }

    #[test]
    fn defaults_without_arguments() {
        let options = parse_args(args(&[])).unwrap();
        assert!(options.scene.is_none());
        assert_eq!(options.scope, CollisionScope::Region);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(args(&["--seed"])).is_err());
        assert!(parse_args(args(&["--seed", "many"])).is_err());
        assert!(parse_args(args(&["--scope", "world"])).is_err());
        assert!(parse_args(args(&["a.json", "b.json"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
    }
}
