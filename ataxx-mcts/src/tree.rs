//! MCTS Tree structure and node management
//!
//! Uses arena allocation for efficient tree operations.
//!
//! ## Architecture
//! - Level 2: Tree operations (expand, select_leaf, backpropagate)
//! - Level 3: UCB1 calculation, node accessors
//! - Level 4: Statistics, utilities

use ataxx_core::{GameResult, GameState, Move, Player};
use rand::Rng;

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// Transition between two nodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Play(Move),
    /// Forced pass: the side to move has no legal move
    Pass,
}

/// Statistics for a tree node
#[derive(Clone, Debug, Default)]
pub struct NodeStats {
    /// Number of times this node was visited
    pub visits: u32,
    /// Total reward from the perspective of the player who moved TO this node
    pub wins: f32,
}

impl NodeStats {
    /// Win rate from this node's perspective
    pub fn win_rate(&self) -> f32 {
        if self.visits == 0 {
            0.5 // Prior for unexplored nodes
        } else {
            self.wins / self.visits as f32
        }
    }
}

/// A node in the MCTS tree
#[derive(Clone, Debug)]
pub struct MctsNode {
    /// Game state at this node
    pub state: GameState,
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Edge that led to this node (None for root)
    pub incoming: Option<Edge>,
    /// Player whose action produced this node
    pub mover: Player,
    /// Children: (edge, node_id) pairs
    pub children: Vec<(Edge, NodeId)>,
    /// Edges not yet expanded
    pub untried: Vec<Edge>,
    /// Visit/win statistics
    pub stats: NodeStats,
    /// Cached game result (if terminal)
    pub cached_result: Option<GameResult>,
}

impl MctsNode {
    /// Create a new node
    pub fn new(state: GameState, parent: Option<NodeId>, incoming: Option<Edge>) -> Self {
        let cached_result = if state.is_game_over() {
            Some(state.result())
        } else {
            None
        };

        let untried = if cached_result.is_some() {
            Vec::new()
        } else {
            let moves: Vec<Edge> = state.legal_moves().into_iter().map(Edge::Play).collect();
            if moves.is_empty() {
                vec![Edge::Pass]
            } else {
                moves
            }
        };

        Self {
            mover: state.current_player().opponent(),
            state,
            parent,
            incoming,
            children: Vec::new(),
            untried,
            stats: NodeStats::default(),
            cached_result,
        }
    }

    /// Is this a terminal node?
    pub fn is_terminal(&self) -> bool {
        self.cached_result.is_some()
    }

    /// Is this node fully expanded?
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }
}

// ============================================================================
// MCTS TREE (Level 2 - Tree Operations)
// ============================================================================

/// MCTS search tree with arena allocation
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storage for nodes
    nodes: Vec<MctsNode>,
}

impl MctsTree {
    /// Create a new tree with the given root state
    pub fn new(root_state: GameState) -> Self {
        Self {
            nodes: vec![MctsNode::new(root_state, None, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Select a leaf node using tree policy (UCB1)
    pub fn select_leaf(&self, exploration: f32) -> NodeId {
        let mut current = self.root();

        while self.get(current).is_fully_expanded() && !self.get(current).is_terminal() {
            match self.select_best_child(current, exploration) {
                Some(child) => current = child,
                None => break,
            }
        }

        current
    }

    /// Expand a node by adding one randomly chosen untried child
    pub fn expand<R: Rng>(&mut self, node_id: NodeId, rng: &mut R) -> Option<NodeId> {
        let node = self.get_mut(node_id);
        if node.untried.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..node.untried.len());
        let edge = node.untried.swap_remove(idx);

        let mut child_state = self.get(node_id).state.clone();
        match edge {
            Edge::Play(mv) => child_state.play(mv),
            Edge::Pass => child_state.pass(),
        }

        let child_id = NodeId(self.nodes.len());
        self.nodes.push(MctsNode::new(child_state, Some(node_id), Some(edge)));
        self.get_mut(node_id).children.push((edge, child_id));

        Some(child_id)
    }

    // ========================================================================
    // Level 3: Selection Helpers
    // ========================================================================

    fn select_best_child(&self, node_id: NodeId, exploration: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = node.stats.visits;

        node.children
            .iter()
            .max_by(|(_, a), (_, b)| {
                let ucb_a = self.ucb1(*a, parent_visits, exploration);
                let ucb_b = self.ucb1(*b, parent_visits, exploration);
                ucb_a.partial_cmp(&ucb_b).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(_, id)| *id)
    }

    /// UCB1 = wins/visits + C * sqrt(ln(parent_visits) / visits)
    fn ucb1(&self, node_id: NodeId, parent_visits: u32, exploration: f32) -> f32 {
        let stats = &self.get(node_id).stats;
        if stats.visits == 0 {
            return f32::INFINITY;
        }

        let exploitation = stats.win_rate();
        let exploration_term =
            exploration * ((parent_visits.max(1) as f32).ln() / stats.visits as f32).sqrt();

        exploitation + exploration_term
    }

    // ========================================================================
    // Level 2: Backpropagation
    // ========================================================================

    /// Backpropagate a rollout reward (black's share, in [0, 1]) from leaf to root
    pub fn backpropagate(&mut self, leaf_id: NodeId, black_reward: f32) {
        let mut current = Some(leaf_id);

        while let Some(node_id) = current {
            let node = self.get_mut(node_id);
            node.stats.visits += 1;
            node.stats.wins += match node.mover {
                Player::Black => black_reward,
                Player::White => 1.0 - black_reward,
            };
            current = node.parent;
        }
    }

    // ========================================================================
    // Level 3: Root statistics
    // ========================================================================

    /// Root moves with their visit counts and win rates
    pub fn move_statistics(&self) -> Vec<(Move, u32, f32)> {
        self.get(self.root())
            .children
            .iter()
            .filter_map(|(edge, id)| match edge {
                Edge::Play(mv) => {
                    let stats = &self.get(*id).stats;
                    Some((*mv, stats.visits, stats.win_rate()))
                }
                Edge::Pass => None,
            })
            .collect()
    }

    /// Total simulations run (root visits)
    pub fn total_simulations(&self) -> u32 {
        self.get(self.root()).stats.visits
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ataxx_core::Board;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn mock_state() -> GameState {
        GameState::new(Board::default_layout(), Player::Black)
    }

    #[test]
    fn test_tree_creation() {
        let tree = MctsTree::new(mock_state());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId::ROOT);
        assert_eq!(tree.get(NodeId::ROOT).mover, Player::White);
        assert_eq!(tree.get(NodeId::ROOT).untried.len(), 16);
    }

    #[test]
    fn test_node_stats_win_rate() {
        let mut stats = NodeStats::default();
        assert_eq!(stats.win_rate(), 0.5);

        stats.visits = 10;
        stats.wins = 7.0;
        assert!((stats.win_rate() - 0.7).abs() < 0.001);
    }

    #[test]
    fn test_tree_expansion() {
        let mut tree = MctsTree::new(mock_state());
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let child = tree.expand(NodeId::ROOT, &mut rng).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(child).parent, Some(NodeId::ROOT));
        assert_eq!(tree.get(child).mover, Player::Black);
        assert_eq!(tree.get(NodeId::ROOT).untried.len(), 15);
    }

    #[test]
    fn test_forced_pass_edge() {
        // White is walled in but black can still move
        let board = Board::parse("B......\n.......\n.......\n.......\n###....\n###....\nW##....").unwrap();
        let mut state = GameState::new(board, Player::White);
        assert!(state.legal_moves().is_empty());
        assert!(!state.is_game_over());

        let node = MctsNode::new(state.clone(), None, None);
        assert_eq!(node.untried, vec![Edge::Pass]);

        state.pass();
        assert_eq!(state.current_player(), Player::Black);
    }

    #[test]
    fn test_backpropagation_perspective() {
        let mut tree = MctsTree::new(mock_state());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let child = tree.expand(NodeId::ROOT, &mut rng).unwrap();

        // Black (who moved into `child`) wins the rollout
        tree.backpropagate(child, 1.0);

        assert_eq!(tree.get(child).stats.visits, 1);
        assert_eq!(tree.get(child).stats.wins, 1.0);
        assert_eq!(tree.get(NodeId::ROOT).stats.visits, 1);
        assert_eq!(tree.get(NodeId::ROOT).stats.wins, 0.0);
    }
}
