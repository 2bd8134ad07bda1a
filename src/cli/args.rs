//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::Category;

/// Atelier asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: atelier.toml)
    #[arg(short = 'C', long, default_value = "atelier.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands (default: dev)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build and serve with file watching and live reload (default)
    #[command(visible_alias = "d")]
    Dev {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// One-shot build of every category, no server
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Run a single category task
    #[command(visible_alias = "r")]
    Run {
        /// Category to run
        #[arg(value_enum)]
        category: CategoryArg,

        #[command(flatten)]
        build_args: BuildArgs,
    },
}

/// Shared build arguments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Enable production mode (minification, suffix renaming, image
    /// recompression). Absent means development mode.
    #[arg(short = 'P', long)]
    pub production: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// CLI-facing category names.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CategoryArg {
    Views,
    Styles,
    Scripts,
    Vendor,
    Images,
    Webp,
    Fonts,
    Sprite,
}

impl CategoryArg {
    pub fn to_category(self) -> Category {
        match self {
            Self::Views => Category::Templates,
            Self::Styles => Category::Styles,
            Self::Scripts => Category::Scripts,
            Self::Vendor => Category::Vendor,
            Self::Images => Category::Images,
            Self::Webp => Category::Webp,
            Self::Fonts => Category::Fonts,
            Self::Sprite => Category::Sprite,
        }
    }
}

impl Cli {
    /// Shared build args of whichever subcommand is active (the implied
    /// `dev` default has none on the command line).
    pub fn build_args(&self) -> BuildArgs {
        match &self.command {
            Some(
                Commands::Dev { build_args, .. }
                | Commands::Build { build_args }
                | Commands::Run { build_args, .. },
            ) => build_args.clone(),
            None => BuildArgs::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_dev() {
        let cli = Cli::parse_from(["atelier"]);
        assert!(cli.command.is_none());
        assert!(!cli.build_args().production);
    }

    #[test]
    fn test_build_production_flag() {
        let cli = Cli::parse_from(["atelier", "build", "--production"]);
        assert!(cli.build_args().production);
    }

    #[test]
    fn test_run_category_parses() {
        let cli = Cli::parse_from(["atelier", "run", "styles"]);
        match cli.command {
            Some(Commands::Run { category, .. }) => {
                assert_eq!(category.to_category(), Category::Styles);
            }
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn test_category_arg_covers_all() {
        for arg in [
            CategoryArg::Views,
            CategoryArg::Styles,
            CategoryArg::Scripts,
            CategoryArg::Vendor,
            CategoryArg::Images,
            CategoryArg::Webp,
            CategoryArg::Fonts,
            CategoryArg::Sprite,
        ] {
            // each maps into the orchestration set
            assert!(Category::ALL.contains(&arg.to_category()));
        }
    }
}
