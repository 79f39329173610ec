//! treegrid demo - Entry Point

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use treegrid::grid::TreeGrid;
use treegrid::model::Tree;
use treegrid::nav::NavigationPolicy;
use treegrid::view::constants::LAZY_LOAD_DELAY;
use treegrid::view::demo::{demo_columns, demo_tree, demo_types, load_columns, load_specs};
use treegrid::view::LazyLoader;
use tracing::info;

/// treegrid - browse a large virtualized tree grid in the terminal
#[derive(Parser, Debug)]
#[command(name = "treegrid")]
#[command(version)]
#[command(about = "Virtualized tree grid demo with lazy loading and cell navigation")]
pub struct Args {
    /// Number of nodes to generate (ignored with --data)
    #[arg(short, long, default_value = "2000", value_parser = clap::value_parser!(u32).range(1..))]
    pub nodes: u32,

    /// Maximum nesting depth of generated nodes
    #[arg(short, long, default_value = "4", value_parser = clap::value_parser!(u32).range(1..=32))]
    pub depth: u32,

    /// Load nodes from a JSON array of node specs
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Load columns from a JSON array of column declarations
    #[arg(long)]
    pub columns: Option<PathBuf>,

    /// Navigation mode: row, cell, start-row or start-cell
    #[arg(long, value_parser = NavigationPolicy::from_str)]
    pub nav_mode: Option<NavigationPolicy>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the log file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Make some lazy loads fail, to exercise error rows and retries
    #[arg(long)]
    pub fail_lazy: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = treegrid::config::load_config_with_precedence(args.config.clone())?;
        let merged = treegrid::config::merge_config(config_file);
        let with_env = treegrid::config::apply_env_overrides(merged);
        treegrid::config::apply_cli_overrides(with_env, args.nav_mode, args.log_file.clone())
    };

    treegrid::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    let specs = match &args.data {
        Some(path) => load_specs(path)?,
        None => demo_tree(args.nodes as usize, args.depth as usize),
    };
    let columns = match &args.columns {
        Some(path) => load_columns(path)?,
        None => demo_columns(),
    };

    let tree = Tree::from_specs(specs)?;
    let grid = TreeGrid::new(tree, columns, config.to_grid_options())?.with_node_types(demo_types());
    let loader = LazyLoader::spawn(LAZY_LOAD_DELAY, args.fail_lazy);

    treegrid::view::run_with_grid(grid, loader)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["treegrid", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["treegrid", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["treegrid"]);
        assert_eq!(args.nodes, 2000);
        assert_eq!(args.depth, 4);
        assert_eq!(args.data, None);
        assert_eq!(args.columns, None);
        assert_eq!(args.nav_mode, None);
        assert_eq!(args.config, None);
        assert_eq!(args.log_file, None);
        assert!(!args.fail_lazy);
    }

    #[test]
    fn test_nodes_and_depth() {
        let args = Args::parse_from(["treegrid", "--nodes", "50000", "-d", "6"]);
        assert_eq!(args.nodes, 50000);
        assert_eq!(args.depth, 6);
    }

    #[test]
    fn test_nodes_rejects_zero() {
        let result = Args::try_parse_from(["treegrid", "--nodes", "0"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_nav_mode_names() {
        for (name, policy) in [
            ("row", NavigationPolicy::RowOnly),
            ("cell", NavigationPolicy::CellOnly),
            ("start-row", NavigationPolicy::StartRowAllowCell),
            ("start-cell", NavigationPolicy::StartCellAllowRow),
        ] {
            let args = Args::parse_from(["treegrid", "--nav-mode", name]);
            assert_eq!(args.nav_mode, Some(policy), "{name}");
        }
    }

    #[test]
    fn test_nav_mode_invalid_rejects() {
        let result = Args::try_parse_from(["treegrid", "--nav-mode", "diagonal"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_data_and_columns_paths() {
        let args = Args::parse_from([
            "treegrid",
            "--data",
            "nodes.json",
            "--columns",
            "columns.json",
            "--fail-lazy",
        ]);
        assert_eq!(args.data, Some(PathBuf::from("nodes.json")));
        assert_eq!(args.columns, Some(PathBuf::from("columns.json")));
        assert!(args.fail_lazy);
    }

    #[test]
    fn test_nav_mode_flows_through_config_precedence_chain() {
        use treegrid::config::{apply_cli_overrides, apply_env_overrides, merge_config, ConfigFile};

        let config_file = ConfigFile {
            navigation_mode: Some(NavigationPolicy::CellOnly),
            ..ConfigFile::default()
        };

        let merged = merge_config(Some(config_file));
        assert_eq!(merged.navigation_mode, NavigationPolicy::CellOnly);

        // TREEGRID_NAV_MODE is not set here.
        let with_env = apply_env_overrides(merged);
        assert_eq!(with_env.navigation_mode, NavigationPolicy::CellOnly);

        let with_cli = apply_cli_overrides(with_env, Some(NavigationPolicy::RowOnly), None);
        assert_eq!(
            with_cli.navigation_mode,
            NavigationPolicy::RowOnly,
            "CLI mode should override all other sources"
        );
    }
}
