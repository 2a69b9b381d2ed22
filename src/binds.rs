//! Variable bindings: a chain of scopes shared by closures.

use crate::object::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Scope {
	bindings: HashMap<String, Object>,
	parent: Option<Env>,
}

/// A handle to one scope of the chain.
///
/// Cloning the handle shares the scope, so a closure and the code that
/// created it see the same bindings.
#[derive(Clone, Default)]
pub struct Env(Rc<RefCell<Scope>>);

impl Env {
	/// An empty top-level scope.
	pub fn new() -> Self {
		Self::default()
	}

	/// A fresh scope whose lookups fall back to `parent`.
	pub fn new_enclosed(parent: &Env) -> Self {
		Env(Rc::new(RefCell::new(Scope { bindings: HashMap::new(), parent: Some(parent.clone()) })))
	}

	/// Looks `name` up, walking outward through the parents.
	pub fn get(
		&self,
		name: &str,
	) -> Option<Object> {
		let scope = self.0.borrow();
		match scope.bindings.get(name) {
			Some(value) => Some(value.clone()),
			None => scope.parent.as_ref().and_then(|p| p.get(name)),
		}
	}

	/// Binds `name` in this scope only, replacing an earlier binding.
	pub fn set(
		&self,
		name: impl Into<String>,
		value: Object,
	) {
		self.0.borrow_mut().bindings.insert(name.into(), value);
	}

	/// Names bound directly in this scope, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.0.borrow().bindings.keys().cloned().collect();
		names.sort();
		names
	}

	/// Whether two handles point at the same scope.
	pub fn ptr_eq(
		&self,
		other: &Env,
	) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for Env {
	// bindings may hold closures over this very scope
	fn fmt(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		f.debug_struct("Env").field("names", &self.names()).finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_walks_to_parent() {
		let global = Env::new();
		global.set("x", Object::Number(1));

		let inner = Env::new_enclosed(&global);
		assert_eq!(inner.get("x"), Some(Object::Number(1)));
		assert_eq!(inner.get("y"), None);
	}

	#[test]
	fn set_shadows_without_touching_parent() {
		let global = Env::new();
		global.set("x", Object::Number(1));

		let inner = Env::new_enclosed(&global);
		inner.set("x", Object::Number(2));

		assert_eq!(inner.get("x"), Some(Object::Number(2)));
		assert_eq!(global.get("x"), Some(Object::Number(1)));
	}

	#[test]
	fn later_set_overwrites() {
		let env = Env::new();
		env.set("x", Object::Number(1));
		env.set("x", Object::Bool(true));
		assert_eq!(env.get("x"), Some(Object::Bool(true)));
		assert_eq!(env.names(), vec!["x"]);
	}

	#[test]
	fn clones_share_bindings() {
		let env = Env::new();
		let alias = env.clone();
		alias.set("k", Object::Number(10));
		assert_eq!(env.get("k"), Some(Object::Number(10)));
		assert!(env.ptr_eq(&alias));
	}
}
