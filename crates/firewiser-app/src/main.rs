use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};

use firewiser_app::cli::{self, CliArgs, USAGE};
use firewiser_app::game_loop::{spawn_session_loop, LoopSummary};
use firewiser_app::state::{AppState, LoopCommand};
use firewiser_core::commands::OperatorCommand;
use firewiser_core::config::ScenarioConfig;
use firewiser_services::air_quality::{aqi_band_color, GoogleAirQuality};
use firewiser_services::guidance::GeminiGuidance;
use firewiser_services::population::SimulatedPopulation;
use firewiser_services::weather::SimulatedWeather;
use firewiser_services::{
    gather_briefing, run_drop_zone_resolver, Briefing, BriefingSources, ServiceConfig,
};
use firewiser_sim::SessionConfig;

/// How often the driver looks at the latest snapshot.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = cli::parse(&args).context("invalid arguments")?;
    if cli.help {
        println!("{USAGE}");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let summary = runtime.block_on(drive(cli))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("failed to encode run summary")?
    );
    Ok(())
}

fn load_scenario(cli: &CliArgs) -> ScenarioConfig {
    let mut scenario = match &cli.scenario {
        Some(path) => ScenarioConfig::load(path).unwrap_or_else(|err| {
            log::warn!(
                "Could not load scenario {}: {err}. Using the built-in scenario.",
                path.display()
            );
            ScenarioConfig::default()
        }),
        None => ScenarioConfig::default(),
    };
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    scenario
}

fn print_briefing(briefing: &Briefing) {
    println!("== {} ==", briefing.guidance.profile);
    println!("{}", briefing.guidance.headline());
    for item in briefing.guidance.checklist_by_priority() {
        println!("  {}. {}", item.priority, item.item);
    }
    match &briefing.weather {
        Some(w) => println!(
            "Weather: {}°F, {}% humidity, wind {} mph {}. {}",
            w.temperature_f, w.humidity_pct, w.wind_speed_mph, w.wind_direction, w.description
        ),
        None => println!("Weather: unavailable"),
    }
    match &briefing.air_quality {
        Some(aq) => {
            let (r, g, b) = aqi_band_color(aq.aqi);
            println!(
                "Air quality: AQI {} ({}, band #{r:02x}{g:02x}{b:02x}), dominant pollutant {}. {}",
                aq.aqi,
                aq.category,
                aq.dominant_pollutant,
                aq.advice()
            )
        }
        None => println!("Air quality: unavailable"),
    }
}

async fn drive(cli: CliArgs) -> anyhow::Result<LoopSummary> {
    let scenario = load_scenario(&cli);
    let services = ServiceConfig::from_env();
    let client = reqwest::Client::builder()
        .timeout(services.timeout)
        .build()
        .context("failed to build HTTP client")?;

    // 1. Map session on its own thread
    let state = AppState::new();
    let (request_tx, request_rx) = tokio::sync::mpsc::unbounded_channel();
    let (cmd_tx, handle) = spawn_session_loop(
        SessionConfig::new(scenario.clone()),
        Arc::clone(&state.latest_snapshot),
        request_tx,
    );
    *state
        .command_tx
        .lock()
        .map_err(|_| anyhow!("command channel lock poisoned"))? = Some(cmd_tx.clone());

    // 2. Drop-zone resolver, fed by the loop. Started before the briefing so
    // a slow guidance call never holds up the population lookup.
    let population = SimulatedPopulation::new(
        services.simulated_latency,
        scenario.seed.wrapping_add(2),
    );
    let timeout = services.timeout;
    let resolver = tokio::spawn(async move {
        run_drop_zone_resolver(&population, request_rx, timeout, |resolved| {
            cmd_tx.send(LoopCommand::DropZoneResolved(resolved)).is_ok()
        })
        .await;
    });

    // 3. Briefing: guidance, air quality and weather in parallel
    let guidance = GeminiGuidance::new(client.clone(), &services);
    let air_quality = GoogleAirQuality::new(client, &services);
    let weather = SimulatedWeather::new(services.simulated_latency, scenario.seed);
    let briefing = gather_briefing(
        BriefingSources {
            guidance: &guidance,
            air_quality: &air_quality,
            weather: &weather,
        },
        cli.profile,
        scenario.map_center,
        services.timeout,
    )
    .await;
    print_briefing(&briefing);

    // 4. Dispatch the tanker once a drop zone is known, then let it fly
    let deadline = tokio::time::Instant::now() + Duration::from_secs_f64(cli.seconds);
    let mut dispatched = false;
    while tokio::time::Instant::now() < deadline {
        tokio::time::sleep(POLL_INTERVAL).await;
        let zone_known = state
            .snapshot()
            .map(|s| s.drop_zone.is_some())
            .unwrap_or(false);
        if zone_known && !dispatched {
            dispatched = state.send(LoopCommand::Operator(OperatorCommand::DispatchAircraft {
                aircraft_id: scenario.commandable_aircraft,
                target: None,
            }));
        }
    }
    if !dispatched {
        log::warn!("No drop zone within {}s, tanker stayed on standby", cli.seconds);
    }

    // 5. Teardown
    state.send(LoopCommand::Shutdown);
    let summary = tokio::task::spawn_blocking(move || handle.join())
        .await
        .context("failed to join session loop")?
        .map_err(|_| anyhow!("session loop panicked"))?;
    resolver.abort();

    Ok(summary)
}
