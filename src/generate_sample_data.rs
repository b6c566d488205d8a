//! Seeds the configured data store with random, valid survey responses.
//!
//! Usage: `generate_sample_data [count]` (default 20). The store is chosen by
//! `DATA_STORE_URL`, exactly as for the server.

use rand::Rng;
use rand::seq::SliceRandom;
use std::env;
use survey_api::config::DataStoreUrl;
use survey_api::models::{AGE_RANGE, Animal, AnimalResponse, RATING_RANGE, Response};
use survey_api::{config, logging, store};
use tracing::{error, info};

const DEFAULT_COUNT: usize = 20;
const MAX_SAMPLE_OWNED: i64 = 20;

fn random_response<R: Rng>(rng: &mut R) -> Response {
    let picked = rng.gen_range(0..=Animal::ALL.len());
    let animals = Animal::ALL
        .choose_multiple(rng, picked)
        .map(|animal| {
            let answer = AnimalResponse {
                rating: rng.gen_range(RATING_RANGE.0..=RATING_RANGE.1),
                owned: rng.gen_range(0..=MAX_SAMPLE_OWNED),
            };
            (animal.as_key().to_string(), answer)
        })
        .collect();

    Response {
        animals,
        age: rng.gen_range(AGE_RANGE.0..=AGE_RANGE.1),
    }
}

#[tokio::main]
async fn main() {
    logging::init();

    let count = match env::args().nth(1) {
        Some(arg) => match arg.parse::<usize>() {
            Ok(count) => count,
            Err(_) => {
                error!(arg = %arg, "Count must be a positive integer");
                std::process::exit(2);
            }
        },
        None => DEFAULT_COUNT,
    };

    let raw_url = env::var("DATA_STORE_URL")
        .unwrap_or_else(|_| config::DEFAULT_DATA_STORE_URL.to_string());
    let survey_store = match DataStoreUrl::parse(&raw_url) {
        Ok(url) => match store::connect(&url).await {
            Ok(survey_store) => survey_store,
            Err(e) => {
                error!(error = %e, "Failed to set up data store");
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!(error = %e, "Invalid DATA_STORE_URL");
            std::process::exit(1);
        }
    };

    let mut rng = rand::thread_rng();
    for _ in 0..count {
        let response = random_response(&mut rng);
        match survey_store.add_survey_response(response).await {
            Ok(stored) => info!(id = %stored.id, age = stored.response.age, "Inserted sample response"),
            Err(e) => {
                error!(error = %e, "Failed to insert sample response");
                std::process::exit(1);
            }
        }
    }

    info!(count, "Sample data generated");
}
