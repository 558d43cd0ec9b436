//! Fused callables.
//!
//! A fused wrapper publishes the merged signature of its sources plus any
//! keyword-only parameters of its own. Its body receives one [`SourceProxy`]
//! per source holding that source's share of the call's arguments, and decides
//! when and how often each source actually runs.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use signia_merge::{
    merge_with_owners, ConflictPolicy, ConflictResolver, Conflict, MergeError, MergeOptions,
    MergeOutcome, MergeResult, OnConflict, Policy,
};
use signia_types::{Kind, Parameter, Signature, SignatureError, SignatureSource};
use tracing::{debug, warn};

use crate::arguments::{bind, Arguments};
use crate::callable::{Callable, Descriptor};
use crate::error::{Collision, CombineError, CombineResult};

// ---------------------------------------------------------------------------
// FuseConflict
// ---------------------------------------------------------------------------

/// How same-named parameters across fused sources are handled.
#[derive(Clone, Default)]
pub enum FuseConflict {
    /// Any shared name is a [`Collision::Name`].
    #[default]
    Error,
    /// Shared names must agree on defaults; the leftmost source's parameter
    /// is published.
    Left,
    /// Shared names must agree on defaults; the rightmost source's parameter
    /// is published.
    Right,
    /// Shared names are reconciled by a merge resolver.
    Resolver(Arc<dyn ConflictResolver>),
}

impl FuseConflict {
    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn(&str, &Parameter, &Parameter, &[Conflict]) -> MergeResult<Parameter>
            + Send
            + Sync
            + 'static,
    {
        Self::Resolver(Arc::new(f))
    }
}

impl fmt::Debug for FuseConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("Error"),
            Self::Left => f.write_str("Left"),
            Self::Right => f.write_str("Right"),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl FromStr for FuseConflict {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(MergeError::UnknownPolicy(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// FuseOptions
// ---------------------------------------------------------------------------

/// Options for [`fuse`].
#[derive(Clone, Debug, Default)]
pub struct FuseOptions {
    pub conflict: FuseConflict,
    /// Whether differing annotations on shared names are a collision in
    /// `Left`/`Right` mode.
    pub compare_annotations: bool,
    /// Keyword-only parameters of the wrapper itself.
    pub extra: Vec<Parameter>,
    pub doc: Option<String>,
}

impl FuseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conflict(mut self, conflict: FuseConflict) -> Self {
        self.conflict = conflict;
        self
    }

    pub fn compare_annotations(mut self, compare: bool) -> Self {
        self.compare_annotations = compare;
        self
    }

    /// Declare a keyword-only parameter consumed by the wrapper body.
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.extra.push(parameter);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Signature merging
// ---------------------------------------------------------------------------

/// Merge the signatures of fused sources under a collision mode.
pub fn merge_fused_signatures(
    sources: &[Arc<dyn Callable>],
    conflict: &FuseConflict,
    compare_annotations: bool,
) -> CombineResult<MergeOutcome> {
    let options = match conflict {
        FuseConflict::Resolver(resolver) => MergeOptions {
            on_conflict: Some(OnConflict::Resolver(Arc::clone(resolver))),
            ..MergeOptions::default()
        },
        FuseConflict::Error | FuseConflict::Left | FuseConflict::Right => {
            check_collisions(sources, conflict, compare_annotations)?;
            let policy = match conflict {
                FuseConflict::Right => Policy::PreferLast,
                _ => Policy::PreferFirst,
            };
            MergeOptions::default()
                .with_policy(policy)
                .with_on_conflict(ConflictPolicy::from(policy))
        }
    };

    let refs: Vec<&dyn SignatureSource> =
        sources.iter().map(|s| s as &dyn SignatureSource).collect();
    Ok(merge_with_owners(&refs, &options)?)
}

fn check_collisions(
    sources: &[Arc<dyn Callable>],
    conflict: &FuseConflict,
    compare_annotations: bool,
) -> CombineResult<()> {
    let mut seen: HashMap<&str, (&str, &Parameter)> = HashMap::new();

    for source in sources {
        for param in source.signature() {
            let prior = seen.get(param.name.as_str()).copied();
            let Some((owner, first)) = prior else {
                seen.insert(param.name.as_str(), (source.name(), param));
                continue;
            };

            let collision = match conflict {
                FuseConflict::Error => Some(Collision::Name),
                _ if first.default != param.default => Some(Collision::Default),
                _ if compare_annotations && first.annotation != param.annotation => {
                    Some(Collision::Annotation)
                }
                _ => None,
            };
            if let Some(collision) = collision {
                warn!(parameter = %param.name, %collision, left = %owner, right = %source.name(), "fused sources collide");
                return Err(CombineError::Collision {
                    parameter: param.name.clone(),
                    collision,
                    left: owner.to_string(),
                    right: source.name().to_string(),
                });
            }
            if param.kind.is_variadic() {
                warn!(
                    parameter = %param.name,
                    kind = %param.kind,
                    "variadic parameter shared by fused sources; each receives the same values"
                );
            }
        }
    }
    Ok(())
}

/// Add the wrapper's own keyword-only parameters to the merged signature.
fn publish(merged: Signature, extra: &[Parameter]) -> CombineResult<Signature> {
    if extra.is_empty() {
        return Ok(merged);
    }
    if let Some(param) = extra.iter().find(|p| p.kind != Kind::KeywordOnly) {
        return Err(CombineError::InvalidExtra {
            parameter: param.name.clone(),
            reason: format!("must be keyword-only, got {}", param.kind),
        });
    }

    let (mut parameters, return_annotation) = merged.into_parts();
    let at = parameters
        .iter()
        .position(|p| p.kind == Kind::VarKeyword)
        .unwrap_or(parameters.len());
    let tail = parameters.split_off(at);
    parameters.extend(extra.iter().cloned());
    parameters.extend(tail);

    Signature::new(parameters, return_annotation).map_err(|e| match e {
        SignatureError::DuplicateParameter(name) => CombineError::InvalidExtra {
            parameter: name,
            reason: "already declared by a source".into(),
        },
        other => CombineError::Merge(MergeError::Invariant(other)),
    })
}

// ---------------------------------------------------------------------------
// CallVars / SourceProxy
// ---------------------------------------------------------------------------

/// Snapshot of one invocation of a fused source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallVars {
    pub args: Vec<Value>,
    pub kwargs: BTreeMap<String, Value>,
    /// Bound arguments in parameter order, defaults applied.
    pub arguments: Vec<(String, Value)>,
    pub result: Value,
}

/// One source's share of a fused call.
///
/// Calling the proxy with no arguments runs the source once and memoizes the
/// result. Calling it with overrides always runs the source and leaves the
/// memoized call untouched.
pub struct SourceProxy {
    source: Arc<dyn Callable>,
    args: Arguments,
    cached: Mutex<Option<Arc<CallVars>>>,
    last: Mutex<Option<Arc<CallVars>>>,
}

impl SourceProxy {
    pub fn new(source: Arc<dyn Callable>, args: Arguments) -> Self {
        Self {
            source,
            args,
            cached: Mutex::new(None),
            last: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &Arc<dyn Callable> {
        &self.source
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// Positional arguments routed to the source.
    pub fn args(&self) -> &[Value] {
        &self.args.positional
    }

    /// Keyword arguments routed to the source.
    pub fn kw(&self) -> &BTreeMap<String, Value> {
        &self.args.keywords
    }

    pub fn arguments(&self) -> &Arguments {
        &self.args
    }

    /// Parameter names of the source, in order.
    pub fn params(&self) -> impl Iterator<Item = &str> + '_ {
        self.source.signature().names()
    }

    /// Default values declared by the source.
    pub fn defaults(&self) -> BTreeMap<String, Value> {
        self.source
            .signature()
            .iter()
            .filter_map(|p| p.default.value().map(|v| (p.name.clone(), v.clone())))
            .collect()
    }

    /// Run the source with its routed arguments, at most once.
    pub fn call(&self) -> CombineResult<Value> {
        let cached = self.cached.lock().expect("proxy cache mutex poisoned").clone();
        let vars = match cached {
            Some(vars) => vars,
            None => {
                let vars = self.invoke(self.args.clone())?;
                *self.cached.lock().expect("proxy cache mutex poisoned") = Some(Arc::clone(&vars));
                vars
            }
        };
        let result = vars.result.clone();
        *self.last.lock().expect("proxy vars mutex poisoned") = Some(vars);
        Ok(result)
    }

    /// Run the source with some routed arguments replaced.
    ///
    /// Positional overrides replace routed positionals by index. Keyword
    /// overrides replace the routed value of the named parameter wherever it
    /// was routed. Empty overrides are the same as [`SourceProxy::call`].
    pub fn call_with(&self, overrides: Arguments) -> CombineResult<Value> {
        if overrides.is_empty() {
            return self.call();
        }
        let vars = self.invoke(self.overridden(overrides))?;
        let result = vars.result.clone();
        *self.last.lock().expect("proxy vars mutex poisoned") = Some(vars);
        Ok(result)
    }

    /// Snapshot of the most recent call through this proxy.
    pub fn vars(&self) -> Option<Arc<CallVars>> {
        self.last.lock().expect("proxy vars mutex poisoned").clone()
    }

    fn overridden(&self, overrides: Arguments) -> Arguments {
        let mut args = self.args.clone();
        for (index, value) in overrides.positional.into_iter().enumerate() {
            match args.positional.get_mut(index) {
                Some(slot) => *slot = value,
                None => args.positional.push(value),
            }
        }
        for (name, value) in overrides.keywords {
            let index = self
                .source
                .signature()
                .iter()
                .filter(|p| p.kind.accepts_positional())
                .position(|p| p.name == name);
            match index.and_then(|i| args.positional.get_mut(i)) {
                Some(slot) => *slot = value,
                None => {
                    args.keywords.insert(name, value);
                }
            }
        }
        args
    }

    fn invoke(&self, args: Arguments) -> CombineResult<Arc<CallVars>> {
        let signature = self.source.signature();
        let mut bound = bind(signature, args.clone())
            .map_err(|e| CombineError::binding(self.name(), e))?;
        bound.apply_defaults();
        let arguments = signature
            .iter()
            .filter_map(|p| bound.get(&p.name).map(|v| (p.name.clone(), v.clone())))
            .collect();

        debug!(source = %self.name(), "calling fused source");
        let result = self.source.call(args.clone())?;
        Ok(Arc::new(CallVars {
            args: args.positional,
            kwargs: args.keywords,
            arguments,
            result,
        }))
    }
}

impl fmt::Debug for SourceProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceProxy")
            .field("source", &self.name())
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// FusedCall / Fused
// ---------------------------------------------------------------------------

/// What a fused wrapper body receives for one call.
#[derive(Debug)]
pub struct FusedCall {
    proxies: Vec<SourceProxy>,
    extras: BTreeMap<String, Value>,
}

impl FusedCall {
    /// One proxy per source, in source order.
    pub fn proxies(&self) -> &[SourceProxy] {
        &self.proxies
    }

    pub fn proxy(&self, index: usize) -> Option<&SourceProxy> {
        self.proxies.get(index)
    }

    /// The first proxy whose source has the given name.
    pub fn source(&self, name: &str) -> Option<&SourceProxy> {
        self.proxies.iter().find(|p| p.name() == name)
    }

    /// Values of the wrapper's own parameters.
    pub fn extras(&self) -> &BTreeMap<String, Value> {
        &self.extras
    }

    pub fn extra<T: DeserializeOwned>(&self, name: &str) -> CombineResult<T> {
        let value = self.extras.get(name).ok_or_else(|| CombineError::Argument {
            name: name.to_string(),
            reason: "not a wrapper parameter".into(),
        })?;
        serde_json::from_value(value.clone()).map_err(|e| CombineError::Argument {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}

type FuseBody = dyn Fn(&FusedCall) -> CombineResult<Value> + Send + Sync;

/// A wrapper publishing the merged signature of its sources.
pub struct Fused {
    descriptor: Descriptor,
    sources: Vec<Arc<dyn Callable>>,
    extras: Vec<String>,
    owners: BTreeMap<String, usize>,
    body: Arc<FuseBody>,
}

impl Fused {
    pub fn sources(&self) -> &[Arc<dyn Callable>] {
        &self.sources
    }

    /// Index of the source owning each merged parameter.
    pub fn owners(&self) -> &BTreeMap<String, usize> {
        &self.owners
    }
}

impl SignatureSource for Fused {
    fn signature(&self) -> &Signature {
        &self.descriptor.signature
    }
}

impl Callable for Fused {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn call(&self, args: Arguments) -> CombineResult<Value> {
        let mut bound = bind(&self.descriptor.signature, args)
            .map_err(|e| CombineError::binding(&self.descriptor.name, e))?;
        bound.apply_defaults();

        let proxies = self
            .sources
            .iter()
            .map(|source| {
                let args = bound
                    .project(source.signature())
                    .map_err(|e| CombineError::binding(source.name(), e))?;
                Ok(SourceProxy::new(Arc::clone(source), args))
            })
            .collect::<CombineResult<Vec<_>>>()?;
        let extras = self
            .extras
            .iter()
            .filter_map(|name| bound.get(name).map(|v| (name.clone(), v.clone())))
            .collect();

        debug!(callable = %self.descriptor.name, sources = proxies.len(), "running fused body");
        (self.body)(&FusedCall { proxies, extras })
    }
}

impl fmt::Debug for Fused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fused")
            .field("descriptor", &self.descriptor)
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Build a fused wrapper named `name` over `sources`.
pub fn fuse<F>(
    name: impl Into<String>,
    sources: Vec<Arc<dyn Callable>>,
    options: &FuseOptions,
    body: F,
) -> CombineResult<Fused>
where
    F: Fn(&FusedCall) -> CombineResult<Value> + Send + Sync + 'static,
{
    let outcome = merge_fused_signatures(&sources, &options.conflict, options.compare_annotations)?;
    let signature = publish(outcome.signature, &options.extra)?;

    let mut descriptor = Descriptor::new(name, signature);
    descriptor.doc = options.doc.clone();
    debug!(
        callable = %descriptor.name,
        sources = sources.len(),
        parameters = descriptor.signature.len(),
        "fused signature built"
    );

    Ok(Fused {
        descriptor,
        sources,
        extras: options.extra.iter().map(|p| p.name.clone()).collect(),
        owners: outcome.owners,
        body: Arc::new(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Function;
    use serde_json::json;

    type Log = Arc<Mutex<Vec<(String, Value)>>>;

    fn sig(text: &str) -> Signature {
        text.parse().unwrap()
    }

    /// A function that records its bound arguments and computes `f` over them.
    fn logged<F>(name: &str, signature: &str, log: &Log, f: F) -> Arc<dyn Callable>
    where
        F: Fn(&BTreeMap<String, Value>) -> Value + Send + Sync + 'static,
    {
        let log = Arc::clone(log);
        let label = name.to_string();
        Arc::new(Function::new(name, sig(signature), move |args| {
            log.lock().unwrap().push((label.clone(), json!(args.arguments())));
            Ok(f(args.arguments()))
        }))
    }

    fn int(args: &BTreeMap<String, Value>, name: &str) -> i64 {
        args[name].as_i64().unwrap()
    }

    fn sum_xy(log: &Log) -> Arc<dyn Callable> {
        logged("target", "(x: int, *, y: int) -> int", log, |a| {
            json!(int(a, "x") + int(a, "y"))
        })
    }

    // -----------------------------------------------------------------------
    // SourceProxy
    // -----------------------------------------------------------------------

    #[test]
    fn proxy_memoizes_zero_argument_calls() {
        let log = Log::default();
        let proxy = SourceProxy::new(sum_xy(&log), Arguments::new().arg(2).kwarg("y", 3));
        assert_eq!(proxy.call().unwrap(), json!(5));
        assert_eq!(proxy.call().unwrap(), json!(5));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn overrides_bypass_the_memoized_call() {
        let log = Log::default();
        let proxy = SourceProxy::new(sum_xy(&log), Arguments::new().arg(4).kwarg("y", 5));
        assert_eq!(proxy.call().unwrap(), json!(9));
        assert_eq!(proxy.call_with(Arguments::new().kwarg("y", 7)).unwrap(), json!(11));
        assert_eq!(proxy.call_with(Arguments::new().kwarg("x", 1)).unwrap(), json!(6));
        assert_eq!(proxy.call_with(Arguments::new()).unwrap(), json!(9));
        let calls: Vec<Value> = log.lock().unwrap().iter().map(|(_, a)| a.clone()).collect();
        assert_eq!(
            calls,
            vec![json!({"x": 4, "y": 5}), json!({"x": 4, "y": 7}), json!({"x": 1, "y": 5})]
        );
    }

    #[test]
    fn proxy_exposes_routed_arguments() {
        let log = Log::default();
        let sample = logged("sample", "(a: int, b: int = 2, *, c: int = 3, d: int)", &log, |_| {
            Value::Null
        });
        let proxy = SourceProxy::new(sample, Arguments::new().arg(1).kwarg("d", 4));
        assert_eq!(proxy.args(), &[json!(1)]);
        assert_eq!(proxy.kw(), &BTreeMap::from([("d".to_string(), json!(4))]));
        assert_eq!(proxy.params().collect::<Vec<_>>(), ["a", "b", "c", "d"]);
        assert_eq!(
            proxy.defaults(),
            BTreeMap::from([("b".to_string(), json!(2)), ("c".to_string(), json!(3))])
        );
        assert!(proxy.vars().is_none());
    }

    #[test]
    fn call_vars_track_cached_and_overridden_calls() {
        let log = Log::default();
        let multiply = logged("multiply", "(value: int, *, factor: int = 1) -> int", &log, |a| {
            json!(int(a, "value") * int(a, "factor"))
        });
        let fused = fuse("wrapper", vec![multiply], &FuseOptions::default(), |call| {
            let proxy = &call.proxies()[0];
            let mut total = 0;
            let mut snapshots = Vec::new();
            for overrides in [Arguments::new(), Arguments::new(), Arguments::new().kwarg("factor", 3)] {
                total += proxy.call_with(overrides)?.as_i64().unwrap_or_default();
                snapshots.push(proxy.vars().unwrap());
            }
            let (first, second, third) = (&snapshots[0], &snapshots[1], &snapshots[2]);
            assert!(Arc::ptr_eq(first, second));
            assert_eq!(first.args, vec![json!(4)]);
            assert_eq!(first.kwargs, BTreeMap::from([("factor".to_string(), json!(1))]));
            assert_eq!(
                first.arguments,
                vec![("value".to_string(), json!(4)), ("factor".to_string(), json!(1))]
            );
            assert_eq!(first.result, json!(4));
            assert_eq!(third.kwargs, BTreeMap::from([("factor".to_string(), json!(3))]));
            assert_eq!(third.result, json!(12));
            assert!(Arc::ptr_eq(third, &proxy.vars().unwrap()));
            Ok(json!(total))
        })
        .unwrap();

        assert_eq!(fused.call(Arguments::new().arg(4)).unwrap(), json!(4 + 4 + 12));
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    // -----------------------------------------------------------------------
    // fuse
    // -----------------------------------------------------------------------

    #[test]
    fn fused_wrapper_routes_each_source() {
        let log = Log::default();
        let load = logged("load", "(x: int, *, y: int = 1) -> int", &log, |a| {
            json!(int(a, "x") + int(a, "y"))
        });
        let audit = logged("audit", "(z: int) -> int", &log, |a| json!(int(a, "z") * 2));
        let options = FuseOptions::new().with_conflict(FuseConflict::Left);
        let pipeline = fuse("pipeline", vec![load, audit], &options, |call| {
            let first = call.source("load").unwrap().call()?;
            let second = call.source("audit").unwrap().call()?;
            Ok(json!(first.as_i64().unwrap() + second.as_i64().unwrap()))
        })
        .unwrap();

        assert_eq!(pipeline.signature().names().collect::<Vec<_>>(), ["x", "z", "y"]);
        assert_eq!(
            pipeline.signature().get("y").unwrap().default.value(),
            Some(&json!(1))
        );

        let result = pipeline.call(Arguments::new().arg(3).arg(4).kwarg("y", 5)).unwrap();
        assert_eq!(result, json!((3 + 5) + 4 * 2));
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ("load".to_string(), json!({"x": 3, "y": 5})),
                ("audit".to_string(), json!({"z": 4})),
            ]
        );
    }

    #[test]
    fn sources_run_only_when_the_body_asks() {
        let log = Log::default();
        let base = logged("base", "(value: int)", &log, |a| json!(int(a, "value") * 2));
        let repeat = fuse("repeat", vec![base], &FuseOptions::default(), |call| {
            let proxy = &call.proxies()[0];
            let twice = proxy.call()?.as_i64().unwrap_or_default() + proxy.call()?.as_i64().unwrap_or_default();
            Ok(json!(twice))
        })
        .unwrap();
        assert_eq!(repeat.call(Arguments::new().arg(3)).unwrap(), json!(12));
        assert_eq!(log.lock().unwrap().len(), 1);

        let skip = fuse("skip", vec![logged("never", "()", &log, |_| Value::Null)], &FuseOptions::default(), |_| {
            Ok(json!("skipped"))
        })
        .unwrap();
        assert_eq!(skip.call(Arguments::new()).unwrap(), json!("skipped"));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn wrapper_parameters_are_published() {
        let log = Log::default();
        let source = logged("source", "(value: int)", &log, |a| a["value"].clone());
        let options = FuseOptions::new().with_parameter(Parameter::keyword_only("new_input").with_default(0));
        let ext = fuse("ext", vec![source], &options, |call| {
            let base = call.proxies()[0].call()?.as_i64().unwrap_or_default();
            Ok(json!(base + call.extra::<i64>("new_input")?))
        })
        .unwrap();

        assert_eq!(ext.signature().to_string(), "(value: int, *, new_input=0)");
        assert_eq!(ext.signature().get("new_input").unwrap().kind, Kind::KeywordOnly);
        assert_eq!(ext.call(Arguments::new().arg(5).kwarg("new_input", 7)).unwrap(), json!(12));
        assert_eq!(*log.lock().unwrap(), vec![("source".to_string(), json!({"value": 5}))]);
    }

    #[test]
    fn wrapper_parameters_precede_var_keyword() {
        let log = Log::default();
        let source = logged("source", "(a, **rest)", &log, |_| Value::Null);
        let options = FuseOptions::new().with_parameter(Parameter::keyword_only("mode"));
        let fused = fuse("f", vec![source], &options, |_| Ok(Value::Null)).unwrap();
        assert_eq!(fused.signature().to_string(), "(a, *, mode, **rest)");
    }

    #[test]
    fn invalid_wrapper_parameters_rejected() {
        let log = Log::default();
        let options = FuseOptions::new().with_parameter(Parameter::positional("p"));
        let err = fuse("f", vec![logged("s", "(a)", &log, |_| Value::Null)], &options, |_| Ok(Value::Null))
            .unwrap_err();
        assert!(matches!(err, CombineError::InvalidExtra { ref parameter, .. } if parameter == "p"));

        let options = FuseOptions::new().with_parameter(Parameter::keyword_only("a"));
        let err = fuse("f", vec![logged("s", "(a)", &log, |_| Value::Null)], &options, |_| Ok(Value::Null))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid wrapper parameter 'a': already declared by a source");
    }

    #[test]
    fn shared_variadics_reach_every_source() {
        let log = Log::default();
        let left = logged("left", "(*values: int)", &log, |_| Value::Null);
        let right = logged("right", "(*values: int)", &log, |_| Value::Null);
        let options = FuseOptions::new().with_conflict(FuseConflict::Left);
        let merged = fuse("merged", vec![left, right], &options, |call| {
            for proxy in call.proxies() {
                proxy.call()?;
            }
            Ok(Value::Null)
        })
        .unwrap();
        merged.call(Arguments::new().arg(1).arg(2).arg(3)).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ("left".to_string(), json!({"values": [1, 2, 3]})),
                ("right".to_string(), json!({"values": [1, 2, 3]})),
            ]
        );
    }

    #[test]
    fn fused_wrappers_compose() {
        let log = Log::default();
        let double = logged("double", "(value: int)", &log, |a| json!(int(a, "value") * 2));
        let triple = logged("triple", "(value: int)", &log, |a| json!(int(a, "value") * 3));
        let stage: Arc<dyn Callable> = Arc::new(
            fuse("stage", vec![double], &FuseOptions::default(), |call| {
                call.proxies()[0].call()
            })
            .unwrap(),
        );
        let options = FuseOptions::new().with_conflict(FuseConflict::Left);
        let pipeline = fuse("pipeline", vec![stage, triple], &options, |call| {
            let a = call.proxies()[0].call()?.as_i64().unwrap_or_default();
            let b = call.proxies()[1].call()?.as_i64().unwrap_or_default();
            Ok(json!(a + b))
        })
        .unwrap();
        assert_eq!(pipeline.call(Arguments::new().arg(2)).unwrap(), json!(2 * 2 + 2 * 3));
        let names: Vec<String> = log.lock().unwrap().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, ["double", "triple"]);
    }

    #[test]
    fn binding_errors_surface_before_the_body_runs() {
        let log = Log::default();
        let fused = fuse("f", vec![sum_xy(&log)], &FuseOptions::default(), |_| {
            panic!("body must not run")
        })
        .unwrap();
        let err = fused.call(Arguments::new().arg(1)).unwrap_err();
        assert_eq!(err.to_string(), "cannot call 'f': missing a required argument: 'y'");
    }

    // -----------------------------------------------------------------------
    // Collision modes
    // -----------------------------------------------------------------------

    #[test]
    fn shared_names_collide_by_default() {
        let log = Log::default();
        let sources = vec![
            logged("left", "(x: int) -> int", &log, |_| Value::Null),
            logged("right", "(x: int) -> int", &log, |_| Value::Null),
        ];
        let err = merge_fused_signatures(&sources, &FuseConflict::Error, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "parameter name collision for 'x' between 'left' and 'right'"
        );
    }

    #[test]
    fn left_mode_rejects_default_mismatch() {
        let log = Log::default();
        let sources = vec![
            logged("left_default", "(y: int = 1)", &log, |_| Value::Null),
            logged("right_default", "(y: int = 2)", &log, |_| Value::Null),
        ];
        let err = merge_fused_signatures(&sources, &FuseConflict::Left, false).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("default mismatch"), "{message}");
        assert!(message.contains("left_default") && message.contains("right_default"));
    }

    #[test]
    fn right_mode_compares_annotations_on_request() {
        let log = Log::default();
        let sources = vec![
            logged("left_annotation", "(z: int) -> int", &log, |_| Value::Null),
            logged("right_annotation", "(z: str) -> str", &log, |_| Value::Null),
        ];
        let outcome = merge_fused_signatures(&sources, &FuseConflict::Right, false).unwrap();
        assert_eq!(outcome.signature.to_string(), "(z: str) -> str");
        assert_eq!(outcome.owners["z"], 1);

        let err = merge_fused_signatures(&sources, &FuseConflict::Right, true).unwrap_err();
        assert!(matches!(
            err,
            CombineError::Collision { collision: Collision::Annotation, .. }
        ));
    }

    #[test]
    fn resolver_mode_matches_plain_merge() {
        let log = Log::default();
        let left = logged("left", "(a: int = 1, *, flag: bool = false) -> int", &log, |_| Value::Null);
        let right = logged("right", "(a: int = 2, *, extra: str = \"x\") -> int", &log, |_| Value::Null);
        let conflict = FuseConflict::resolver(|_, _, incoming, _| Ok(incoming.clone()));
        let outcome =
            merge_fused_signatures(&[Arc::clone(&left), Arc::clone(&right)], &conflict, false)
                .unwrap();

        let options = MergeOptions::default().with_resolver(|_, _, incoming, _| Ok(incoming.clone()));
        let expected = signia_merge::merge_signatures(&[&left, &right], &options).unwrap();
        assert_eq!(outcome.signature, expected);
        assert_eq!(
            outcome.owners,
            BTreeMap::from([("a".to_string(), 1), ("flag".to_string(), 0), ("extra".to_string(), 1)])
        );
        assert!(!outcome.has_var_positional && !outcome.has_var_keyword);
    }

    #[test]
    fn left_mode_without_overlap_is_a_plain_merge() {
        let log = Log::default();
        let primary = logged("primary", "(value: int, /, *values: int, **options: int) -> int", &log, |_| Value::Null);
        let helper = logged("helper", "(*, toggle: bool = false)", &log, |_| Value::Null);
        let outcome =
            merge_fused_signatures(&[Arc::clone(&primary), Arc::clone(&helper)], &FuseConflict::Left, false)
                .unwrap();
        let expected =
            signia_merge::merge_signatures(&[&primary, &helper], &MergeOptions::default()).unwrap();
        assert_eq!(outcome.signature, expected);
        assert_eq!(outcome.owners["values"], 0);
        assert_eq!(outcome.owners["toggle"], 1);
        assert!(outcome.has_var_positional && outcome.has_var_keyword);
    }

    #[test]
    fn conflict_modes_parse() {
        assert!(matches!("left".parse::<FuseConflict>(), Ok(FuseConflict::Left)));
        assert!(matches!("right".parse::<FuseConflict>(), Ok(FuseConflict::Right)));
        assert!(matches!("error".parse::<FuseConflict>(), Ok(FuseConflict::Error)));
        assert_eq!(
            "invalid".parse::<FuseConflict>().unwrap_err(),
            MergeError::UnknownPolicy("invalid".into())
        );
        assert_eq!(format!("{:?}", FuseConflict::resolver(|_, e, _, _| Ok(e.clone()))), "Resolver(..)");
    }
}
