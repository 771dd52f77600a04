//! `credit-risk train`: the styled training run

use std::time::Instant;

use anyhow::{Context, Result};
use console::style;

use super::args::TrainArgs;
use crate::pipeline::positive_rate;
use crate::registry::FileStore;
use crate::report::{display_evaluation, export_evaluation};
use crate::train::{evaluate, fit_pipeline, prepare_data, publish};
use crate::utils::{
    create_spinner, finish_with_failure, finish_with_success, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
    TrainCard,
};

pub fn run_train(args: &TrainArgs) -> Result<()> {
    let config = args.to_config();
    let total = Instant::now();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&TrainCard {
        data: &config.data_path,
        label_column: &config.label_column,
        model: config.model,
        tracking_dir: &args.tracking_dir,
        model_name: &config.model_name,
        test_size: config.test_size,
        seed: config.seed,
    });

    // Step 1: load and split
    print_step_header(1, "Load & Split");
    let step = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let split = match prepare_data(&config) {
        Ok(split) => split,
        Err(e) => {
            finish_with_failure(&spinner, "Dataset could not be prepared");
            return Err(e);
        }
    };
    finish_with_success(&spinner, "Dataset loaded");
    print_count(
        "Train rows:",
        split.y_train.len(),
        Some(format!("({:.1}% high risk)", positive_rate(&split.y_train) * 100.0).as_str()),
    );
    print_count(
        "Test rows: ",
        split.y_test.len(),
        Some(format!("({:.1}% high risk)", positive_rate(&split.y_test) * 100.0).as_str()),
    );
    print_count("Feature columns:", split.x_train.width(), None);
    print_step_time(step.elapsed());

    // Step 2: fit the combined pipeline
    print_step_header(2, "Fit Pipeline");
    let step = Instant::now();
    let spinner = create_spinner(&format!("Fitting {}...", config.model.display_name()));
    let pipeline = match fit_pipeline(&split, config.model) {
        Ok(p) => p,
        Err(e) => {
            finish_with_failure(&spinner, "Fit failed");
            return Err(e);
        }
    };
    finish_with_success(
        &spinner,
        &format!(
            "{} fitted on {} encoded features",
            config.model.display_name(),
            pipeline.features.n_features_out()
        ),
    );
    print_step_time(step.elapsed());

    // Step 3: evaluate on the held-out split
    print_step_header(3, "Evaluate");
    let evaluation = evaluate(&pipeline, &split.x_test, &split.y_test)?;
    display_evaluation(&evaluation);

    // Step 4: log and register
    print_step_header(4, "Log & Register");
    let spinner = create_spinner("Writing run to the tracking store...");
    let store = match FileStore::create(&args.tracking_dir).with_context(|| {
        format!(
            "Failed to open tracking store at {}",
            args.tracking_dir.display()
        )
    }) {
        Ok(store) => store,
        Err(e) => {
            finish_with_failure(&spinner, "Tracking store unavailable");
            return Err(e);
        }
    };
    let outcome = match publish(&store, &config, &pipeline, &split.x_train, &evaluation) {
        Ok(outcome) => outcome,
        Err(e) => {
            finish_with_failure(&spinner, "Publishing failed");
            return Err(e);
        }
    };
    finish_with_success(&spinner, &format!("Run {} logged", outcome.run.run_name));
    print_info(&format!("Artifact: {}", style(&outcome.model_uri).cyan()));
    print_success(&format!(
        "Registered {} version {}",
        outcome.version.name, outcome.version.version
    ));

    if let Some(path) = &args.report {
        export_evaluation(&outcome, &config, pipeline.feature_names(), path)?;
        print_info(&format!("Evaluation report written to {}", path.display()));
    }

    print_step_time(total.elapsed());
    print_completion("Training complete!");
    Ok(())
}
