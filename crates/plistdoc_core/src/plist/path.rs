use std::fmt;

/// One step from a container to a child value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
	/// Select a dictionary entry by key.
	Key(String),
	/// Select an array element by zero-based index.
	Index(usize),
}

/// Location of a value inside a plist tree, rendered as `$.key[2].other`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath {
	steps: Vec<PathStep>,
}

impl KeyPath {
	/// Path addressing the root value.
	pub fn root() -> Self {
		Self::default()
	}

	/// Ordered steps from the root.
	pub fn steps(&self) -> &[PathStep] {
		&self.steps
	}

	/// Return `true` when the path addresses the root value.
	pub fn is_root(&self) -> bool {
		self.steps.is_empty()
	}

	/// Append a step.
	pub fn push(&mut self, step: PathStep) {
		self.steps.push(step);
	}

	pub(crate) fn push_front(&mut self, step: PathStep) {
		self.steps.insert(0, step);
	}
}

impl fmt::Display for KeyPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("$")?;
		for step in &self.steps {
			match step {
				PathStep::Key(key) => write!(f, ".{key}")?,
				PathStep::Index(index) => write!(f, "[{index}]")?,
			}
		}
		Ok(())
	}
}
