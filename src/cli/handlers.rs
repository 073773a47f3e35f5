// src/cli/handlers.rs
use crate::auc::{rank_predictors, AucEvaluator, Method, ProbeSet};
use crate::cli::args::{GraphArgs, ModeArg, ModelArg};
use crate::config::Config;
use crate::error::ShieldError;
use crate::exit::ShieldExit;
use crate::graph::{generators, Edge, Graph};
use crate::predict::{self, LocalIndex, ScoreCache};
use crate::transaction::{subsets, Transaction, TransactionEvaluator};
use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::cmp::Reverse;
use std::path::Path;
use tracing::{debug, info};

/// Loaded config, seeded RNG and the generated graph for one command.
pub struct Session {
    pub config: Config,
    pub seed: u64,
    pub rng: StdRng,
    pub graph: Graph,
}

/// The hidden edge of the best-connected node.
struct Hidden {
    target: usize,
    edge: Edge,
    probes: ProbeSet,
}

impl Session {
    /// # Errors
    /// Returns error if the config cannot be loaded or the graph cannot be built.
    pub fn open(config_path: Option<&Path>, args: &GraphArgs, mode: Option<ModeArg>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => Config::load_local().context("loading local config")?,
        };
        if let Some(mode) = mode {
            config.auc.mode = mode.into();
        }
        let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let graph = build_graph(args, &mut rng)?;
        info!(graph = %graph, seed, "graph generated");
        Ok(Self {
            config,
            seed,
            rng,
            graph,
        })
    }

    fn evaluator(&self) -> AucEvaluator {
        self.config.evaluator(self.seed)
    }

    fn hide_target_edge(&mut self) -> Result<Hidden> {
        let g = &self.graph;
        let target = g
            .nodes()
            .max_by_key(|&v| (g.degree(v), Reverse(v)))
            .ok_or_else(|| anyhow!("graph has no nodes"))?;
        let incident = g.incident_edges(target)?;
        let edge = *incident
            .choose(&mut self.rng)
            .ok_or_else(|| anyhow!("node {target} has no edges"))?;
        let probes = ProbeSet::hide(&mut self.graph, [edge])?;
        debug!(target, %edge, "edge hidden");
        Ok(Hidden {
            target,
            edge,
            probes,
        })
    }
}

/// # Errors
/// Returns error for fewer than three nodes.
pub fn build_graph<R: Rng + ?Sized>(args: &GraphArgs, rng: &mut R) -> Result<Graph> {
    if args.nodes < 3 {
        bail!(ShieldError::Config(format!(
            "--nodes must be at least 3, got {}",
            args.nodes
        )));
    }
    let (n, d, directed) = (args.nodes, args.degree, args.directed);
    let graph = match args.model {
        ModelArg::Ba => generators::barabasi_albert(n, d, directed, rng)?,
        ModelArg::Er => generators::erdos_renyi(n, d, directed, rng)?,
        ModelArg::Ws => generators::small_world(n, d, args.beta, directed, rng)?,
        ModelArg::Cycle => generators::cycle(n, directed)?,
        ModelArg::Grid => {
            let width = (1..=n).find(|w| w * w >= n).unwrap_or(1);
            generators::grid(width, (n + width - 1) / width, directed)?
        }
    };
    Ok(graph)
}

#[derive(Serialize)]
struct PredictorAuc {
    predictor: String,
    auc: f64,
}

#[derive(Serialize)]
struct AucReport {
    graph: String,
    seed: u64,
    target: usize,
    hidden: Edge,
    method: Method,
    results: Vec<PredictorAuc>,
}

/// Handles the auc command.
///
/// # Errors
/// Returns error if evaluation or output fails.
pub fn handle_auc(mut session: Session, json: bool) -> Result<ShieldExit> {
    let hidden = session.hide_target_edge()?;
    let evaluator = session.evaluator();
    let ranking = rank_predictors(&session.graph, &hidden.probes, &predict::all_local(), &evaluator)?;

    let report = AucReport {
        graph: session.graph.to_string(),
        seed: session.seed,
        target: hidden.target,
        hidden: hidden.edge,
        method: evaluator.method_for(&session.graph),
        results: ranking
            .entries()
            .map(|(name, auc)| PredictorAuc {
                predictor: name.clone(),
                auc,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ShieldExit::Success);
    }

    print_header(&report.graph, report.seed);
    println!(
        "hidden {} of node {} ({:?})",
        report.hidden.to_string().yellow(),
        report.target,
        report.method
    );
    for (rank, row) in report.results.iter().enumerate() {
        let line = format!("{:>2}. {:<20} {:.4}", rank + 1, row.predictor, row.auc);
        if rank == 0 {
            println!("{}", line.green().bold());
        } else {
            println!("{line}");
        }
    }
    Ok(ShieldExit::Success)
}

#[derive(Serialize)]
struct ScoredPair {
    edge: Edge,
    score: f64,
}

/// Handles the predict command.
///
/// # Errors
/// Returns error for an unknown predictor or if output fails.
pub fn handle_predict(session: Session, name: &str, top: usize, json: bool) -> Result<ShieldExit> {
    let predictor = predict::by_name(name).ok_or_else(|| {
        let known: Vec<&str> = LocalIndex::ALL.iter().map(|p| p.as_str()).collect();
        ShieldError::Config(format!(
            "unknown predictor '{name}' (expected one of: {})",
            known.join(", ")
        ))
    })?;
    let cache = ScoreCache::new(predictor);
    let best = cache.top_non_edges(&session.graph, top)?;
    let pairs: Vec<ScoredPair> = best
        .as_ranking()
        .entries()
        .map(|(&edge, score)| ScoredPair { edge, score })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&pairs)?);
        return Ok(ShieldExit::Success);
    }

    print_header(&session.graph.to_string(), session.seed);
    println!("top {} non-edges by {}", pairs.len(), cache.name().cyan());
    for (rank, pair) in pairs.iter().enumerate() {
        println!("{:>3}. {:<12} {:.4}", rank + 1, pair.edge.to_string(), pair.score);
    }
    Ok(ShieldExit::Success)
}

#[derive(Serialize)]
struct ShieldReport {
    graph: String,
    seed: u64,
    target: usize,
    hidden: Edge,
    baseline_auc: f64,
    candidates: usize,
    removed: Vec<Edge>,
    auc: f64,
}

/// Handles the shield command.
///
/// # Errors
/// Returns error for an invalid budget or if any evaluation fails.
pub fn handle_shield(mut session: Session, budget: usize, pool: usize, json: bool) -> Result<ShieldExit> {
    let hidden = session.hide_target_edge()?;
    let evaluator = session.evaluator();
    let predictors = predict::all_local();
    let exposure = |g: &Graph| -> crate::error::Result<f64> {
        let ranking = rank_predictors(g, &hidden.probes, &predictors, &evaluator)?;
        Ok(ranking.best_score().unwrap_or(0.0))
    };
    let baseline_auc = exposure(&session.graph)?;

    let mut removable = session.graph.incident_edges(hidden.target)?;
    removable.shuffle(&mut session.rng);
    removable.truncate(pool);
    removable.sort();
    if budget == 0 || budget > removable.len() {
        bail!(ShieldError::Config(format!(
            "--budget must be between 1 and {} (the pool of incident edges)",
            removable.len()
        )));
    }

    let graph_label = session.graph.to_string();
    let candidates = subsets(&removable, budget).map(Transaction::new);
    let mut transactions = TransactionEvaluator::new(&mut session.graph);
    // maximizing the negated AUC picks the least exposed candidate
    let evaluation = transactions.evaluate(candidates, |g| exposure(g).map(|auc| -auc))?;
    let (best, negated) = evaluation
        .best()
        .ok_or_else(|| anyhow!("no removal candidates"))?;

    let report = ShieldReport {
        graph: graph_label,
        seed: session.seed,
        target: hidden.target,
        hidden: hidden.edge,
        baseline_auc,
        candidates: evaluation.len(),
        removed: best.edges().to_vec(),
        auc: -negated,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ShieldExit::Success);
    }

    print_header(&report.graph, report.seed);
    println!(
        "hidden {} of node {}: best AUC {:.4}",
        report.hidden.to_string().yellow(),
        report.target,
        report.baseline_auc
    );
    println!(
        "removing {} lowers it to {} ({} candidates)",
        best.to_string().cyan(),
        format!("{:.4}", report.auc).green().bold(),
        report.candidates
    );
    Ok(ShieldExit::Success)
}

fn print_header(graph: &str, seed: u64) {
    println!("{} {} {}", "graph".bold(), graph, format!("seed={seed}").dimmed());
}
