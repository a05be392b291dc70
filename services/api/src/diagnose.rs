use chrono::NaiveDate;
use clap::Args;
use spot_eraser::diagnosis::{
    BirthYear, Category, Clock, Diagnosis, FixedClock, ProfileKind, QuizProfile, ScoringEngine,
    SystemClock,
};
use spot_eraser::error::AppError;
use std::sync::Arc;

use crate::infra::AnswerList;

#[derive(Args, Debug)]
pub(crate) struct DiagnoseArgs {
    /// Comma-separated answers, one per question (e.g. 1,2,1,1,1,1,2,1,1)
    #[arg(long, value_parser = crate::infra::parse_answers)]
    pub(crate) answers: AnswerList,
    /// Birth year used for the skin-age estimate
    #[arg(long)]
    pub(crate) birth_year: Option<i32>,
    /// Questionnaire generation: extended (12 questions) or classic (9)
    #[arg(long, default_value = "extended")]
    pub(crate) profile: ProfileKind,
    /// Override the answer range policy of the profile
    #[arg(long)]
    pub(crate) strict_range: Option<bool>,
    /// Reference date for age calculations (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the raw result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_diagnose(args: DiagnoseArgs) -> Result<(), AppError> {
    let DiagnoseArgs {
        answers: AnswerList(answers),
        birth_year,
        profile,
        strict_range,
        today,
        json,
    } = args;

    let profile = QuizProfile::resolve(profile, strict_range);
    profile.validate()?;

    let clock: Arc<dyn Clock> = match today {
        Some(date) => Arc::new(FixedClock::on(date)),
        None => Arc::new(SystemClock),
    };
    let engine = ScoringEngine::with_clock(profile, clock);
    let birth_year = birth_year.map(BirthYear::from);
    let diagnosis = engine.compute(&answers, birth_year.as_ref())?;

    if json {
        match serde_json::to_string_pretty(&diagnosis) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Result payload unavailable: {}", err),
        }
    } else {
        render_diagnosis(engine.profile(), &answers, &diagnosis);
    }
    Ok(())
}

fn render_diagnosis(profile: &QuizProfile, answers: &[Option<i64>], diagnosis: &Diagnosis) {
    println!("Skin diagnosis ({} profile)", profile.kind);
    println!("Answers: {}", format_answers(answers));

    println!("\nClass A scores");
    for (category, points) in &diagnosis.scores.skin {
        println!("- {:<12} {}", category.key(), points);
    }
    println!("\nClass B scores");
    for (category, points) in &diagnosis.scores.factor {
        println!("- {:<12} {}", category.key(), points);
    }

    println!(
        "\nSelected: {} / {}",
        diagnosis.skin_type.map(Category::key).unwrap_or("none"),
        diagnosis.external_factor.map(Category::key).unwrap_or("none")
    );
    match diagnosis.code {
        Some(code) => println!("Result code: {code}"),
        None => println!("Result code: none"),
    }
    println!("Artwork: {}", diagnosis.image_path());
    println!("Total score: {}", diagnosis.total_score);

    if let Some(estimate) = &diagnosis.age_estimate {
        println!(
            "Percentile: {} (percentile {})",
            estimate.percentile_label, estimate.percentile
        );
        match estimate.skin_age {
            Some(age) => println!("Skin age: {age}"),
            None => println!("Skin age: unavailable (no birth year)"),
        }
    }
}

fn format_answers(answers: &[Option<i64>]) -> String {
    answers
        .iter()
        .map(|answer| match answer {
            Some(value) => value.to_string(),
            None => "-".to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}
