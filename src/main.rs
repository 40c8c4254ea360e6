use arbor_gp::config::Config;
use arbor_gp::evolution::EvolutionEngine;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    log::info!("Booting arbor_gp...");

    // 1. Load and Validate Configuration
    let config = match Config::load(Path::new("config.toml")) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        log::error!("Invalid configuration: {}", e);
        process::exit(1);
    }
    log::info!("Configuration loaded and validated.");

    // 2. Load the problem and build the initial population
    let data_path = Path::new(&config.data_file);
    let mut engine = match EvolutionEngine::init(data_path, config.engine.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Failed to load the problem: {}", e);
            process::exit(1);
        }
    };

    // 3. Evolve until the generation cap or convergence
    log::info!("--- Starting Evolution ---");
    for _ in 0..config.run.num_generations {
        engine.evolve();
        let stats = engine.stats();
        if stats.best_fitness > -config.run.convergence_threshold {
            log::info!(
                "Converged at generation {} with fitness {:.6}",
                stats.generation,
                stats.best_fitness
            );
            break;
        }
    }

    // 4. Report the champion
    let best = engine.best();
    match engine.render(best, config.run.float_precision) {
        Ok(text) => {
            println!("Best individual (fitness {:.6}):", engine.stats().best_fitness);
            println!("{}", text);
        }
        Err(e) => {
            log::error!("Failed to render the best individual: {}", e);
            process::exit(1);
        }
    }
}
