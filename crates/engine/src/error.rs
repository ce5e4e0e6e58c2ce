// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use tabula_store::StoreError;
use tabula_type::{ColumnId, Diagnostic, IntoDiagnostic, RowId, TableId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
	Required,
	NotANumber,
	InvalidDate,
	Empty,
	Duplicate,
	Reserved,
	TooSmall {
		min: u64,
	},
	TooLarge {
		max: u64,
	},
	/// Options were given for a column that is not a select column.
	OptionsNotApplicable,
}

/// One problem with one named input; `field` is the label shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
	pub field: String,
	pub kind: FieldErrorKind,
}

impl FieldError {
	pub fn new(field: impl Into<String>, kind: FieldErrorKind) -> Self {
		Self {
			field: field.into(),
			kind,
		}
	}

	pub fn required(field: impl Into<String>) -> Self {
		Self::new(field, FieldErrorKind::Required)
	}

	pub fn message(&self) -> String {
		let field = &self.field;
		match &self.kind {
			FieldErrorKind::Required => format!("{} is required", field),
			FieldErrorKind::NotANumber => format!("{} must be a number", field),
			FieldErrorKind::InvalidDate => format!("{} must be a valid date", field),
			FieldErrorKind::Empty => format!("{} must not be empty", field),
			FieldErrorKind::Duplicate => format!("{} is defined more than once", field),
			FieldErrorKind::Reserved => format!("{} is a reserved name", field),
			FieldErrorKind::TooSmall {
				min,
			} => format!("{} must be at least {}", field, min),
			FieldErrorKind::TooLarge {
				max,
			} => format!("{} must be at most {}", field, max),
			FieldErrorKind::OptionsNotApplicable => {
				format!("{} only takes options when it is a select column", field)
			}
		}
	}
}

impl Display for FieldError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.message())
	}
}

/// Every field-level problem found in one input, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
	pub errors: Vec<FieldError>,
}

impl ValidationError {
	pub fn fields(&self) -> impl Iterator<Item = &str> {
		self.errors.iter().map(|error| error.field.as_str())
	}

	pub fn messages(&self) -> Vec<String> {
		self.errors.iter().map(FieldError::message).collect()
	}
}

impl Display for ValidationError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.messages().join("; "))
	}
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
	Table,
	Column,
	Row,
}

impl Display for ObjectKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			ObjectKind::Table => f.write_str("table"),
			ObjectKind::Column => f.write_str("column"),
			ObjectKind::Row => f.write_str("row"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOperation {
	CreateTable,
	UpdateTable,
}

impl Display for SchemaOperation {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			SchemaOperation::CreateTable => f.write_str("create table"),
			SchemaOperation::UpdateTable => f.write_str("update table"),
		}
	}
}

#[derive(Debug)]
pub enum RollbackOutcome {
	Succeeded,
	Failed(Box<StoreError>),
}

impl RollbackOutcome {
	pub fn succeeded(&self) -> bool {
		matches!(self, RollbackOutcome::Succeeded)
	}
}

impl Display for RollbackOutcome {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			RollbackOutcome::Succeeded => f.write_str("succeeded"),
			RollbackOutcome::Failed(err) => write!(f, "failed: {}", err),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("{0}")]
	Malformed(#[from] serde_json::Error),

	#[error("{field} {reason}")]
	Invalid {
		field: &'static str,
		reason: String,
	},
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("validation failed: {0}")]
	Validation(ValidationError),

	#[error("{kind} {id} not found")]
	NotFound {
		kind: ObjectKind,
		id: String,
	},

	#[error("backing store rejected the operation: {0}")]
	BackingStore(#[from] StoreError),

	#[error("{operation} {table} failed part way ({cause}); rollback attempted and {rollback}")]
	PartialFailure {
		operation: SchemaOperation,
		table: TableId,
		#[source]
		cause: StoreError,
		rollback: RollbackOutcome,
	},

	#[error("row {row} of table {table} kept changing concurrently; gave up after {attempts} attempts")]
	Conflict {
		table: TableId,
		row: RowId,
		attempts: u32,
	},

	#[error("invalid configuration: {0}")]
	Config(#[from] ConfigError),
}

impl Error {
	pub fn validation(errors: Vec<FieldError>) -> Self {
		Error::Validation(ValidationError {
			errors,
		})
	}

	pub fn table_not_found(id: TableId) -> Self {
		Error::NotFound {
			kind: ObjectKind::Table,
			id: id.to_string(),
		}
	}

	pub fn column_not_found(id: ColumnId) -> Self {
		Error::NotFound {
			kind: ObjectKind::Column,
			id: id.to_string(),
		}
	}

	pub fn row_not_found(id: RowId) -> Self {
		Error::NotFound {
			kind: ObjectKind::Row,
			id: id.to_string(),
		}
	}

	/// Field errors of a validation failure.
	pub fn field_errors(&self) -> Option<&[FieldError]> {
		match self {
			Error::Validation(validation) => Some(&validation.errors),
			_ => None,
		}
	}

	pub fn diagnostic(&self) -> Diagnostic {
		match self {
			Error::Validation(validation) => {
				let mut diagnostic =
					Diagnostic::new("TABULA_001", self.to_string()).with_label("invalid input");
				for message in validation.messages() {
					diagnostic = diagnostic.with_note(message);
				}
				diagnostic
			}
			Error::NotFound {
				kind,
				..
			} => Diagnostic::new("TABULA_002", self.to_string())
				.with_label(format!("unknown {}", kind))
				.with_help(format!("the {} may have been deleted; reload and try again", kind)),
			Error::BackingStore(err) => {
				let code = match err {
					StoreError::MissingCollection {
						..
					} => "TABULA_004",
					_ => "TABULA_003",
				};
				let diagnostic = Diagnostic::new(code, self.to_string());
				match err.remediation() {
					Some(help) => diagnostic.with_help(help),
					None => diagnostic,
				}
			}
			Error::PartialFailure {
				cause,
				rollback,
				..
			} => {
				let diagnostic = Diagnostic::new("TABULA_005", self.to_string());
				let diagnostic = match cause.remediation() {
					Some(help) => diagnostic.with_help(help),
					None => diagnostic,
				};
				if rollback.succeeded() {
					diagnostic.with_note("the schema was restored to its previous state")
				} else {
					diagnostic.with_note(
						"the schema may be left partially applied; run SchemaRegistry::repair to heal it",
					)
				}
			}
			Error::Conflict {
				..
			} => Diagnostic::new("TABULA_006", self.to_string())
				.with_help("reload the row and apply the change again"),
			Error::Config(_) => Diagnostic::new("TABULA_007", self.to_string()),
		}
	}
}

impl IntoDiagnostic for Error {
	fn into_diagnostic(self) -> Diagnostic {
		self.diagnostic()
	}
}
