//! Test Request Client
//!
//! Generates customer records and posts them to the prediction endpoint
//! for service testing.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Customer record matching the service's request schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerRecord {
    geography: String,
    gender: String,
    age: i64,
    credit_score: i64,
    balance: f64,
    estimated_salary: f64,
    tenure: i64,
    num_of_products: i64,
    satisfaction_score: i64,
    is_active_member: bool,
    has_cr_card: bool,
    complain: bool,
}

/// Customer record generator for testing
struct CustomerGenerator {
    rng: rand::rngs::ThreadRng,
}

impl CustomerGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Generate a typical, engaged customer profile
    fn generate_engaged(&mut self) -> CustomerRecord {
        CustomerRecord {
            geography: self
                .random_choice(&["France", "Germany", "Spain"])
                .to_string(),
            gender: self.random_choice(&["Female", "Male"]).to_string(),
            age: self.rng.gen_range(25..55),
            credit_score: self.rng.gen_range(600..850),
            balance: self.rng.gen_range(0.0..120000.0),
            estimated_salary: self.rng.gen_range(30000.0..150000.0),
            tenure: self.rng.gen_range(3..10),
            num_of_products: self.rng.gen_range(1..3),
            satisfaction_score: self.rng.gen_range(3..6),
            is_active_member: true,
            has_cr_card: self.rng.gen_bool(0.7),
            complain: false,
        }
    }

    /// Generate an at-risk customer profile
    fn generate_at_risk(&mut self) -> CustomerRecord {
        CustomerRecord {
            geography: self
                .random_choice(&["germany", "FRANCE", "spain"]) // mixed casing on purpose
                .to_string(),
            gender: self.random_choice(&["female", "MALE"]).to_string(),
            age: self.rng.gen_range(45..75),             // Older segment
            credit_score: self.rng.gen_range(350..600),  // Poor credit
            balance: 0.0,                                // Empty account
            estimated_salary: self.rng.gen_range(15000.0..60000.0),
            tenure: self.rng.gen_range(0..2),            // New customer
            num_of_products: self.rng.gen_range(3..5),   // Overloaded with products
            satisfaction_score: self.rng.gen_range(1..3),
            is_active_member: false,                     // Inactive
            has_cr_card: self.rng.gen_bool(0.3),
            complain: true,                              // Has complained
        }
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_client=info".parse()?),
        )
        .init();

    info!("Starting Test Request Client");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let base_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("http://127.0.0.1:8000");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(20);
    let at_risk_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.3);
    let delay_ms: u64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        base_url = %base_url,
        count = count,
        at_risk_rate = at_risk_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = reqwest::Client::new();
    let predict_url = format!("{}/predict", base_url);

    // Probe the service before sending the full batch
    match client.get(format!("{}/health", base_url)).send().await {
        Ok(response) => {
            info!(status = %response.status(), "Service is reachable");
        }
        Err(e) => {
            warn!(error = %e, "Service not reachable. Running in dry-run mode.");
            return run_dry_mode(count, at_risk_rate, delay_ms).await;
        }
    }

    let mut generator = CustomerGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Starting to send {} prediction requests...", count);

    let mut engaged_count = 0;
    let mut at_risk_count = 0;

    for i in 0..count {
        let record = if rng.gen_bool(at_risk_rate) {
            at_risk_count += 1;
            generator.generate_at_risk()
        } else {
            engaged_count += 1;
            generator.generate_engaged()
        };

        let response = client.post(&predict_url).json(&record).send().await?;
        let status = response.status();
        let body: serde_json::Value = response.json().await?;

        info!(
            request = i + 1,
            status = %status,
            response = %body,
            "Prediction response"
        );

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Sent {} requests ({} engaged, {} at-risk)",
        count, engaged_count, at_risk_count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, at_risk_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no service connection)");

    let mut generator = CustomerGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let record = if rng.gen_bool(at_risk_rate) {
            generator.generate_at_risk()
        } else {
            generator.generate_engaged()
        };

        let json = serde_json::to_string_pretty(&record)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample request {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
