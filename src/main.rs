use anyhow::{Context, Result};
use clap::Parser;
use overlap_core::TrialInputs;
use overlap_experiment::{FileStore, ParticipantId, Session, TrialPlan, load_config};
use overlap_timing::HighPrecisionTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

mod app;
use app::App;

/// Circle-overlap judgement task: adjust the right circle's size and its
/// overlap with the left circle, then confirm.
#[derive(Parser, Debug)]
#[command(name = "circle-overlap", version, about, long_about = None)]
struct Cli {
    /// First label of a single trial
    #[arg(long, requires = "label2", conflicts_with = "plan")]
    label1: Option<String>,

    /// Second label of a single trial
    #[arg(long, requires = "label1")]
    label2: Option<String>,

    /// Type tag copied into the record
    #[arg(long = "type", default_value = "")]
    kind: String,

    /// 1-based trial index of a single trial
    #[arg(long, default_value_t = 1)]
    trial: u32,

    /// Label table run in order: a CSV file with label1,label2[,type]
    /// columns, or a JSON array of {"label1", "label2", "type"} rows
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Participant the results belong to, at most 20 characters
    #[arg(long, env = "OVERLAP_PARTICIPANT")]
    participant: Option<ParticipantId>,

    /// JSON file holding the accumulated results [default:
    /// overlap_results_<participant>.json, or overlap_results.json]
    #[arg(long)]
    store: Option<PathBuf>,

    /// TOML file overriding the built-in layout and controls
    #[arg(long)]
    config: Option<PathBuf>,

    /// TrueType/OpenType font used instead of the bundled DejaVu Sans
    #[arg(long, env = "OVERLAP_FONT")]
    font: Option<PathBuf>,

    /// PNG window icon
    #[arg(long)]
    icon: Option<PathBuf>,

    /// Seed for the left/right label draw
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn plan(&self) -> Result<TrialPlan> {
        match (&self.plan, &self.label1, &self.label2) {
            (Some(path), _, _) => TrialPlan::from_file(path)
                .with_context(|| format!("loading trial plan {}", path.display())),
            (None, Some(label1), Some(label2)) => Ok(TrialPlan::single(TrialInputs::new(
                self.trial,
                label1.as_str(),
                label2.as_str(),
                self.kind.as_str(),
            ))?),
            _ => anyhow::bail!("pass --label1 and --label2, or --plan"),
        }
    }

    fn store_path(&self) -> PathBuf {
        match (&self.store, &self.participant) {
            (Some(path), _) => path.clone(),
            (None, Some(participant)) => PathBuf::from(participant.results_file_name()),
            (None, None) => PathBuf::from("overlap_results.json"),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("loading configuration")?;
    let plan = cli.plan()?;
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let store = cli.store_path();
    log::info!("{} trial(s), results go to {}", plan.len(), store.display());

    let mut session = Session::new(
        config,
        plan,
        FileStore::new(&store),
        HighPrecisionTimer::new(),
        rng,
    )?;
    if let Some(participant) = cli.participant.clone() {
        session
            .set_participant(participant)
            .with_context(|| format!("writing participant ID to {}", store.display()))?;
    }

    let app = App::new(session, cli.font, cli.icon);
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_trial_arguments() {
        let cli = Cli::try_parse_from([
            "circle-overlap",
            "--label1",
            "apple",
            "--label2",
            "banana",
            "--type",
            "fruit",
            "--trial",
            "3",
        ])
        .unwrap();
        let plan = cli.plan().unwrap();
        assert_eq!(
            plan.trials(),
            &[TrialInputs::new(3, "apple", "banana", "fruit")]
        );
        assert_eq!(cli.store_path(), PathBuf::from("overlap_results.json"));
    }

    #[test]
    fn test_participant_names_the_store() {
        let cli = Cli::try_parse_from([
            "circle-overlap",
            "--plan",
            "labels.csv",
            "--participant",
            "P-07",
        ])
        .unwrap();
        assert_eq!(cli.participant.as_ref().map(ParticipantId::as_str), Some("P-07"));
        assert_eq!(cli.store_path(), PathBuf::from("overlap_results_P-07.json"));

        let cli = Cli::try_parse_from([
            "circle-overlap",
            "--plan",
            "labels.csv",
            "--participant",
            "P-07",
            "--store",
            "all.json",
        ])
        .unwrap();
        assert_eq!(cli.store_path(), PathBuf::from("all.json"));

        assert!(
            Cli::try_parse_from(["circle-overlap", "--plan", "x.csv", "--participant", "a/b"])
                .is_err()
        );
    }

    #[test]
    fn test_label_arguments_are_paired() {
        assert!(Cli::try_parse_from(["circle-overlap", "--label1", "apple"]).is_err());
        assert!(
            Cli::try_parse_from([
                "circle-overlap",
                "--label1",
                "a",
                "--label2",
                "b",
                "--plan",
                "plan.json"
            ])
            .is_err()
        );
        let cli = Cli::try_parse_from(["circle-overlap"]).unwrap();
        assert!(cli.plan().is_err());
    }

    #[test]
    fn test_trial_zero_is_rejected() {
        let cli = Cli::try_parse_from([
            "circle-overlap",
            "--label1",
            "a",
            "--label2",
            "b",
            "--trial",
            "0",
        ])
        .unwrap();
        assert!(cli.plan().is_err());
    }
}
