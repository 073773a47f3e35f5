// tests/integration_auc.rs
//! AUC evaluation, score caching and rankings working together.

use linkshield_core::auc::{
    exact, rank_predictors, AucConfig, AucEvaluator, AucMode, Method, ProbeSet,
};
use linkshield_core::graph::{generators, Edge, Graph};
use linkshield_core::montecarlo::MonteCarloConfig;
use linkshield_core::predict::{self, FnPredictor, LocalIndex, ScoreCache};
use linkshield_core::rank::{BoundedRanking, Ranking};
use linkshield_core::ShieldError;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn evaluator(mode: AucMode) -> AucEvaluator {
    let monte_carlo = MonteCarloConfig {
        portion: 1_000,
        min_iterations: 20_000,
        max_iterations: 400_000,
        precision: 1e-5,
        parallel: true,
    };
    AucEvaluator::new(
        AucConfig {
            mode,
            ..AucConfig::default()
        },
        monte_carlo,
        11,
    )
}

/// Ten nodes, twenty edges: a ring plus chords of length three.
fn chorded_ring() -> Graph {
    let ring = (0..10).map(|i| (i, (i + 1) % 10));
    let chords = (0..10).map(|i| (i, (i + 3) % 10));
    Graph::from_edges("chorded", 10, false, ring.chain(chords)).unwrap()
}

#[test]
fn test_five_cycle_ranks_removed_edge_by_common_neighbours() {
    let mut g = generators::cycle(5, false).unwrap();
    let probes = ProbeSet::hide(&mut g, [Edge::undirected(0, 1)]).unwrap();
    let cache = ScoreCache::new(LocalIndex::CommonNeighbours);

    // Path 1-2-3-4-0: (0,3) via 4, (1,3) via 2, (2,4) via 3; the rest share nothing.
    let ranking = Ranking::from_fn(g.non_edges(), |e| cache.score(&g, e.i(), e.j()).unwrap());
    assert_eq!(ranking.len(), 6);
    let expected = [(0, 3), (1, 3), (2, 4), (0, 1), (0, 2), (1, 4)];
    let order: Vec<(usize, usize)> = ranking.iter().map(Edge::key).collect();
    assert_eq!(order, expected, "ties keep insertion order");

    let removed = Edge::undirected(0, 1);
    assert_eq!(ranking.score(&removed), Some(0.0));
    assert_eq!(ranking.position(&removed), Some(4));
    assert_eq!(ranking.exaequo_position(&removed, 0.0), Some(4));
    assert_eq!(ranking.avg_position(&removed, 0.0), Some(5.0));

    // 3 negatives beat the probe, 2 tie with it: (0 + 2 * 0.5) / 5
    let auc = exact::auc(&g, &probes, &cache).unwrap();
    assert!((auc - 0.2).abs() < 1e-12, "got {auc}");
}

#[test]
fn test_auc_bounds_for_every_local_index() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut g = generators::barabasi_albert(40, 3, false, &mut rng).unwrap();
    let hidden: Vec<Edge> = g.incident_edges(0).unwrap().into_iter().take(2).collect();
    let probes = ProbeSet::hide(&mut g, hidden).unwrap();

    let ranking = rank_predictors(&g, &probes, &predict::all_local(), &evaluator(AucMode::Exact)).unwrap();
    assert_eq!(ranking.len(), LocalIndex::ALL.len());
    for (name, auc) in ranking.entries() {
        assert!((0.0..=1.0).contains(&auc), "{name}: {auc}");
    }
}

#[test]
fn test_perfect_and_constant_predictors() {
    let mut g = chorded_ring();
    let probes = ProbeSet::hide(&mut g, [Edge::undirected(2, 5), Edge::undirected(6, 7)]).unwrap();
    let hidden = probes.clone();

    let oracle = ScoreCache::new(FnPredictor::new("oracle", move |g: &Graph, i, j| {
        if hidden.contains(&g.edge(i, j)) {
            1.0
        } else {
            0.0
        }
    }));
    let flat = ScoreCache::new(FnPredictor::new("flat", |_: &Graph, _, _| 0.3));

    for mode in [AucMode::Exact, AucMode::MonteCarlo] {
        let eval = evaluator(mode);
        let perfect = eval.evaluate(&g, &probes, &oracle).unwrap();
        let constant = eval.evaluate(&g, &probes, &flat).unwrap();
        assert!((perfect.auc - 1.0).abs() < 1e-12, "{mode}: perfect {}", perfect.auc);
        assert!((constant.auc - 0.5).abs() < 1e-12, "{mode}: constant {}", constant.auc);
    }
}

#[test]
fn test_exact_and_sampled_agree() {
    let mut g = chorded_ring();
    assert_eq!(g.edges_count(), 20);
    let probes = ProbeSet::hide(&mut g, [Edge::undirected(0, 3)]).unwrap();

    for index in [LocalIndex::CommonNeighbours, LocalIndex::ResourceAllocation, LocalIndex::Jaccard] {
        let cache = ScoreCache::new(index);
        let exact = evaluator(AucMode::Exact).evaluate(&g, &probes, &cache).unwrap();
        let sampled = evaluator(AucMode::MonteCarlo).evaluate(&g, &probes, &cache).unwrap();
        assert_eq!(exact.method, Method::Exact);
        assert_eq!(sampled.method, Method::MonteCarlo);
        assert!(sampled.iterations >= 20_000);
        // precision stops the run once the running mean settles; it does not bound the sampling error
        assert!(
            (exact.auc - sampled.auc).abs() < 0.02,
            "{index}: exact {} vs sampled {}",
            exact.auc,
            sampled.auc
        );
    }
}

#[test]
fn test_probe_present_in_graph_is_rejected() {
    let g = chorded_ring();
    let probes = ProbeSet::new(&g, [Edge::undirected(0, 5)]).unwrap();
    let mut h = g.clone();
    h.add_edge(0, 5).unwrap();
    let cache = ScoreCache::new(LocalIndex::CommonNeighbours);
    let err = evaluator(AucMode::Exact).evaluate(&h, &probes, &cache).unwrap_err();
    assert!(matches!(err, ShieldError::InvalidProbe(_)), "got {err:?}");
}

#[test]
fn test_cache_follows_graph_mutations() {
    let mut g = Graph::from_edges("path", 5, false, [(0, 1), (3, 4)]).unwrap();
    let cache = ScoreCache::new(LocalIndex::CommonNeighbours);
    assert_eq!(cache.score(&g, 0, 2).unwrap(), 0.0);
    assert!(cache.is_current(&g));

    g.start_recording_history();
    g.add_edge(1, 2).unwrap();
    assert!(!cache.is_current(&g), "edit must stale the cache");
    assert_eq!(cache.score(&g, 0, 2).unwrap(), 1.0, "1 became a common neighbour");

    g.reset_graph().unwrap();
    assert_eq!(cache.score(&g, 0, 2).unwrap(), 0.0, "reset must stale the cache");

    let other = g.clone();
    assert_eq!(cache.score(&other, 0, 2).unwrap(), 0.0);
    assert!(cache.is_current(&other));
    assert!(!cache.is_current(&g), "a clone is a different graph");
}

#[test]
#[allow(clippy::cast_precision_loss)]
fn test_bounded_ranking_keeps_top_scores() {
    let (capacity, extra) = (5, 7);
    let mut top = BoundedRanking::new(capacity);
    for i in 0..capacity + extra {
        top.set_score(i, i as f64);
    }
    assert_eq!(top.len(), capacity);
    let kept: Vec<usize> = top.as_ranking().to_vec();
    assert_eq!(kept, vec![11, 10, 9, 8, 7]);
    assert_eq!(top.worst(), Some(&7));

    assert!(!top.set_score(100, 3.0), "worse than the worst is rejected");
    assert!(!top.set_score(101, 7.0), "a tie with the worst is rejected");
    assert!(top.set_score(8, 0.5), "present elements always update");
    assert_eq!(top.worst(), Some(&8));
    assert_eq!(top.len(), capacity);
}

#[test]
fn test_top_non_edges_matches_full_ranking() {
    let mut rng = StdRng::seed_from_u64(9);
    let g = generators::erdos_renyi(30, 4, false, &mut rng).unwrap();
    let cache = ScoreCache::new(LocalIndex::AdamicAdar);
    let full = cache.non_edges_ranking(&g).unwrap();
    let top = cache.top_non_edges(&g, 10).unwrap();
    let full_scores: Vec<f64> = full.entries().take(10).map(|(_, s)| s).collect();
    let top_scores: Vec<f64> = top.as_ranking().entries().map(|(_, s)| s).collect();
    assert_eq!(full_scores, top_scores);
}
