use std::cmp::Ordering;
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use cprop_shared::logging::Tracer;
use log::debug;

use crate::error::{EngineError, EngineResult};
use crate::ir::bridge::cfg::Node;
use crate::ir::bridge::procedure::Procedure;
use crate::ir::bridge::statement::Stmt;

/// An abstract domain which forms a lattice
pub trait AbstractDomain: Clone + Eq + Debug {
    /// Combine two abstract values at a control-flow confluence
    fn meet(&self, other: &Self) -> Self;

    /// Partial ordering comparison, `None` for incomparable values
    fn partial_order(&self, other: &Self) -> Option<Ordering>;

    /// Get the Bottom value of this lattice
    fn bottom() -> Self;

    /// Get the Top value of this lattice
    fn top() -> Self;
}

/// A sparse map from keys to abstract values, absent keys are bottom
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MapFact<K: Ord, V: AbstractDomain> {
    map: BTreeMap<K, V>,
}

impl<K: Ord + Clone + Debug, V: AbstractDomain> MapFact<K, V> {
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Value of `key`, bottom when unmapped
    pub fn get(&self, key: &K) -> V {
        self.map.get(key).cloned().unwrap_or_else(V::bottom)
    }

    /// Set `key` to `value` and report whether the fact changed
    pub fn update(&mut self, key: K, value: V) -> bool {
        if value == V::bottom() {
            return self.map.remove(&key).is_some();
        }
        match self.map.insert(key, value.clone()) {
            None => true,
            Some(prev) => prev != value,
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove(key)
    }

    /// An independent snapshot of this fact
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Merge every mapping of `other` into this fact and report whether it changed
    pub fn copy_from(&mut self, other: &Self) -> bool {
        let mut changed = false;
        for (key, value) in &other.map {
            changed |= self.update(key.clone(), value.clone());
        }
        changed
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Ord + Clone + Debug, V: AbstractDomain> Default for MapFact<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone + Debug, V: AbstractDomain> FromIterator<(K, V)> for MapFact<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut fact = Self::new();
        for (key, value) in iter {
            fact.update(key, value);
        }
        fact
    }
}

impl<'a, K: Ord, V: AbstractDomain> IntoIterator for &'a MapFact<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

/// The contract between an analysis and the fixpoint solver
pub trait DataflowAnalysis {
    type Fact: Clone + Eq + Debug;

    /// Whether facts flow from entry to exit
    fn is_forward(&self) -> bool;

    /// Fact at the entry (forward) or exit (backward) of the procedure
    fn new_boundary_fact(&self, procedure: &Procedure) -> Self::Fact;

    /// Fact every other node starts with
    fn new_initial_fact(&self) -> Self::Fact;

    /// Meet `fact` into `target`
    fn meet_into(&self, fact: &Self::Fact, target: &mut Self::Fact);

    /// Compute `output` from `input` across `stmt` and report whether `output` changed.
    /// `input` is the in-fact for a forward analysis and the out-fact for a backward one.
    fn transfer_node(&self, stmt: &Stmt, input: &Self::Fact, output: &mut Self::Fact) -> bool;
}

#[derive(Eq, PartialEq, Clone, Debug)]
// (Incoming, Outgoing)
pub struct NodeState<F>(pub F, pub F);

/// Facts before and after every node of a CFG
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct CfgState<F>(BTreeMap<Node, NodeState<F>>);

impl<F: Clone> CfgState<F> {
    pub fn empty() -> Self {
        CfgState(BTreeMap::new())
    }

    fn from<I: Iterator<Item = Node>>(nodes: I, initial: &F) -> Self {
        let mut result = BTreeMap::new();
        for node in nodes {
            result.insert(node, NodeState(initial.clone(), initial.clone()));
        }
        CfgState(result)
    }

    pub fn get_in_fact(&self, node: Node) -> Option<&F> {
        self.0.get(&node).map(|s| &s.0)
    }

    pub fn get_out_fact(&self, node: Node) -> Option<&F> {
        self.0.get(&node).map(|s| &s.1)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Node, NodeState<F>> {
        self.0.iter()
    }

    fn state(&self, node: Node) -> EngineResult<&NodeState<F>> {
        self.0.get(&node).ok_or_else(|| {
            EngineError::InvariantViolation(format!("no dataflow state for node {}", node))
        })
    }

    fn state_mut(&mut self, node: Node) -> EngineResult<&mut NodeState<F>> {
        self.0.get_mut(&node).ok_or_else(|| {
            EngineError::InvariantViolation(format!("no dataflow state for node {}", node))
        })
    }
}

fn stmt_at(procedure: &Procedure, node: Node) -> EngineResult<&Stmt> {
    procedure.stmt(node).ok_or_else(|| {
        EngineError::InvariantViolation(format!("no statement for node {}", node))
    })
}

/// Compute a forward iterated fixedpoint
fn solve_forward<A: DataflowAnalysis>(
    procedure: &Procedure,
    analysis: &A,
) -> EngineResult<CfgState<A::Fact>> {
    let cfg = &procedure.cfg;
    let tracer = Tracer::new(format!("forward {}", procedure.name));

    let mut result = CfgState::from(cfg.nodes(), &analysis.new_initial_fact());
    result.state_mut(cfg.entry())?.1 = analysis.new_boundary_fact(procedure);

    // every node except the entry starts in the worklist
    let mut worklist: BTreeSet<Node> = cfg.nodes().filter(|n| *n != cfg.entry()).collect();

    let mut visits = 0;
    while let Some(node) = worklist.pop_first() {
        visits += 1;

        // join all incoming edges
        let preds: Vec<_> = cfg
            .predecessors(node)
            .into_iter()
            .map(|pred| result.state(pred).map(|s| s.1.clone()))
            .collect::<EngineResult<_>>()?;

        let NodeState(incoming, outgoing) = result.state_mut(node)?;
        for pred_out in &preds {
            analysis.meet_into(pred_out, incoming);
        }

        // call the transfer function
        let stmt = stmt_at(procedure, node)?;
        if !analysis.transfer_node(stmt, incoming, outgoing) {
            continue;
        }
        tracer.log(&format!("{} changed: {:?}", node, outgoing));

        for succ in cfg.successors(node) {
            worklist.insert(succ);
        }
    }

    debug!(
        "[{}] forward fixedpoint reached after {} visits",
        procedure.name, visits
    );
    Ok(result)
}

/// Compute a backward iterated fixedpoint
fn solve_backward<A: DataflowAnalysis>(
    procedure: &Procedure,
    analysis: &A,
) -> EngineResult<CfgState<A::Fact>> {
    let cfg = &procedure.cfg;
    let tracer = Tracer::new(format!("backward {}", procedure.name));

    let mut result = CfgState::from(cfg.nodes(), &analysis.new_initial_fact());
    result.state_mut(cfg.exit())?.0 = analysis.new_boundary_fact(procedure);

    // every node except the exit starts in the worklist
    let mut worklist: BTreeSet<Node> = cfg.nodes().filter(|n| *n != cfg.exit()).collect();

    let mut visits = 0;
    // pop the last node so that a straight-line body is processed bottom-up
    while let Some(node) = worklist.pop_last() {
        visits += 1;

        // successors are the incoming edges this time
        let succs: Vec<_> = cfg
            .successors(node)
            .into_iter()
            .map(|succ| result.state(succ).map(|s| s.0.clone()))
            .collect::<EngineResult<_>>()?;

        let NodeState(incoming, outgoing) = result.state_mut(node)?;
        for succ_in in &succs {
            analysis.meet_into(succ_in, outgoing);
        }

        let stmt = stmt_at(procedure, node)?;
        if !analysis.transfer_node(stmt, outgoing, incoming) {
            continue;
        }
        tracer.log(&format!("{} changed: {:?}", node, incoming));

        for pred in cfg.predecessors(node) {
            worklist.insert(pred);
        }
    }

    debug!(
        "[{}] backward fixedpoint reached after {} visits",
        procedure.name, visits
    );
    Ok(result)
}

/// The direction we traverse the Control Flow Graph
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CfgDirection {
    Forward,
    Backward,
}

impl CfgDirection {
    pub fn of<A: DataflowAnalysis>(analysis: &A) -> Self {
        if analysis.is_forward() {
            Self::Forward
        } else {
            Self::Backward
        }
    }
}

/// Run `analysis` on `procedure` until no fact changes
pub fn execute<A: DataflowAnalysis>(
    procedure: &Procedure,
    analysis: &A,
) -> EngineResult<CfgState<A::Fact>> {
    match CfgDirection::of(analysis) {
        CfgDirection::Forward => solve_forward(procedure, analysis),
        CfgDirection::Backward => solve_backward(procedure, analysis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::adapter;
    use crate::ir::bridge::expression::{Exp, VarId};
    use crate::ir::bridge::statement::LValue;

    /// Two-point lattice used to exercise the solver
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    enum Seen {
        No,
        Yes,
    }

    impl AbstractDomain for Seen {
        fn meet(&self, other: &Self) -> Self {
            if *self == Seen::Yes || *other == Seen::Yes {
                Seen::Yes
            } else {
                Seen::No
            }
        }

        fn partial_order(&self, other: &Self) -> Option<Ordering> {
            Some((*self as u8).cmp(&(*other as u8)))
        }

        fn bottom() -> Self {
            Seen::No
        }

        fn top() -> Self {
            Seen::Yes
        }
    }

    type SeenFact = MapFact<VarId, Seen>;

    fn used_vars(exp: &Exp, out: &mut Vec<VarId>) {
        match exp {
            Exp::Var(var) => out.push(var.id),
            Exp::Binary { lhs, rhs, .. } => {
                used_vars(lhs, out);
                used_vars(rhs, out);
            }
            _ => (),
        }
    }

    /// Forward: variables assigned on some path
    struct Assigned;

    impl DataflowAnalysis for Assigned {
        type Fact = SeenFact;

        fn is_forward(&self) -> bool {
            true
        }

        fn new_boundary_fact(&self, _procedure: &Procedure) -> Self::Fact {
            SeenFact::new()
        }

        fn new_initial_fact(&self) -> Self::Fact {
            SeenFact::new()
        }

        fn meet_into(&self, fact: &Self::Fact, target: &mut Self::Fact) {
            for (var, value) in fact {
                let merged = target.get(var).meet(value);
                target.update(*var, merged);
            }
        }

        fn transfer_node(&self, stmt: &Stmt, input: &Self::Fact, output: &mut Self::Fact) -> bool {
            let mut fact = input.copy();
            if let Some(var) = stmt.defined_var() {
                fact.update(var.id, Seen::Yes);
            }
            output.copy_from(&fact)
        }
    }

    /// Backward: variables read later on some path (liveness without kills)
    struct ReadLater;

    impl DataflowAnalysis for ReadLater {
        type Fact = SeenFact;

        fn is_forward(&self) -> bool {
            false
        }

        fn new_boundary_fact(&self, _procedure: &Procedure) -> Self::Fact {
            SeenFact::new()
        }

        fn new_initial_fact(&self) -> Self::Fact {
            SeenFact::new()
        }

        fn meet_into(&self, fact: &Self::Fact, target: &mut Self::Fact) {
            target.copy_from(fact);
        }

        fn transfer_node(&self, stmt: &Stmt, input: &Self::Fact, output: &mut Self::Fact) -> bool {
            let mut fact = input.copy();
            let mut used = vec![];
            match stmt {
                Stmt::Definition { lvalue: LValue::Var(_), rvalue } => used_vars(rvalue, &mut used),
                Stmt::If { condition, .. } => used_vars(condition, &mut used),
                Stmt::Return { value: Some(var) } => used.push(var.id),
                _ => (),
            }
            for var in used {
                fact.update(var, Seen::Yes);
            }
            output.copy_from(&fact)
        }
    }

    fn build(source: &str) -> Procedure {
        let adapted: adapter::procedure::Procedure = serde_json::from_str(source).unwrap();
        Procedure::convert(&adapted).unwrap()
    }

    // 0: x = 1; 1: if (x > 0) goto 3; 2: y = x; 3: return y;
    const DIAMOND: &str = r#"{
        "name": "diamond",
        "vars": [{"name": "x", "ty": "Int"}, {"name": "y", "ty": "Int"}],
        "params": [],
        "stmts": [
            {"Definition": {"lvalue": {"Var": "x"}, "rvalue": {"IntLiteral": 1}}},
            {"If": {"condition": {"Binary": {"op": "Gt", "lhs": {"Var": "x"}, "rhs": {"IntLiteral": 0}}}, "target": 3}},
            {"Definition": {"lvalue": {"Var": "y"}, "rvalue": {"Var": "x"}}},
            {"Return": {"value": "y"}}
        ]
    }"#;

    #[test]
    fn map_fact_defaults_to_bottom() {
        let mut fact = SeenFact::new();
        assert_eq!(fact.get(&VarId::from(3)), Seen::No);
        assert!(fact.update(VarId::from(3), Seen::Yes));
        assert!(!fact.update(VarId::from(3), Seen::Yes));
        assert_eq!(fact.get(&VarId::from(3)), Seen::Yes);

        // storing bottom drops the key
        assert!(fact.update(VarId::from(3), Seen::No));
        assert!(fact.is_empty());
        assert!(!fact.update(VarId::from(4), Seen::No));
        assert_eq!(fact, SeenFact::new());
    }

    #[test]
    fn map_fact_copy_is_independent() {
        let mut fact: SeenFact = [(VarId::from(0), Seen::Yes)].into_iter().collect();
        let snapshot = fact.copy();
        fact.update(VarId::from(1), Seen::Yes);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(fact.len(), 2);
    }

    #[test]
    fn map_fact_copy_from_merges_keys() {
        let source: SeenFact = [(VarId::from(0), Seen::Yes)].into_iter().collect();
        let mut target: SeenFact = [(VarId::from(1), Seen::Yes)].into_iter().collect();
        assert!(target.copy_from(&source));
        let keys: Vec<_> = target.keys().copied().collect();
        assert_eq!(keys, vec![VarId::from(0), VarId::from(1)]);
        assert!(!target.copy_from(&source));
    }

    #[test]
    fn forward_solver_reaches_join_point() {
        let procedure = build(DIAMOND);
        let state = execute(&procedure, &Assigned).unwrap();

        let x = VarId::from(0);
        let y = VarId::from(1);
        let at_return = state.get_in_fact(Node::Stmt(3)).unwrap();
        assert_eq!(at_return.get(&x), Seen::Yes);
        assert_eq!(at_return.get(&y), Seen::Yes);

        let at_branch = state.get_in_fact(Node::Stmt(1)).unwrap();
        assert_eq!(at_branch.get(&y), Seen::No);
        assert_eq!(state.get_in_fact(Node::Exit), state.get_out_fact(Node::Stmt(3)));
        assert!(state.get_out_fact(Node::Entry).unwrap().is_empty());
    }

    #[test]
    fn backward_solver_flows_against_edges() {
        let procedure = build(DIAMOND);
        assert_eq!(CfgDirection::of(&ReadLater), CfgDirection::Backward);
        let state = execute(&procedure, &ReadLater).unwrap();

        let x = VarId::from(0);
        let y = VarId::from(1);
        // y is read by the return, x by the branch and the copy
        let before_return = state.get_in_fact(Node::Stmt(3)).unwrap();
        assert_eq!(before_return.get(&y), Seen::Yes);
        assert_eq!(before_return.get(&x), Seen::No);

        let before_branch = state.get_in_fact(Node::Stmt(1)).unwrap();
        assert_eq!(before_branch.get(&y), Seen::Yes);
        assert_eq!(before_branch.get(&x), Seen::Yes);

        assert!(state.get_in_fact(Node::Exit).unwrap().is_empty());
    }

    #[test]
    fn solver_terminates_on_loops() {
        // 0: x = 1; 1: goto 0;
        let procedure = build(
            r#"{
                "name": "spin",
                "vars": [{"name": "x", "ty": "Int"}],
                "params": [],
                "stmts": [
                    {"Definition": {"lvalue": {"Var": "x"}, "rvalue": {"IntLiteral": 1}}},
                    {"Goto": {"target": 0}}
                ]
            }"#,
        );
        let state = execute(&procedure, &Assigned).unwrap();
        assert_eq!(
            state.get_in_fact(Node::Stmt(0)).unwrap().get(&VarId::from(0)),
            Seen::Yes
        );
        // nothing reaches the exit
        assert!(state.get_in_fact(Node::Exit).unwrap().is_empty());
    }
}
