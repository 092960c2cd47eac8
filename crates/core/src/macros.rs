// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros shared across the workspace.
//!
//! - [`simple_display!`]: `Display` for tag enums
//! - [`builder!`]: record builders for tests
//! - [`setters!`]: chained setters on production builders

/// `Display` for a unit-variant enum, one string literal per variant.
///
/// ```ignore
/// crate::simple_display! {
///     MetricEvent {
///         Start => "start",
///         HeartbeatFailure => "heartbeat_failure",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident => $str:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( Self::$variant => $str, )+
                })
            }
        }
    };
}

/// Builder over a fully-populated `$target` value, for tests.
///
/// The builder wraps a `$target` holding the listed defaults; each setter
/// overwrites one field and `build()` hands the value back. `option` fields
/// must be `Option<_>` on the target and default to `None` or `Some(_)`.
/// Only compiled with `test` or the `test-support` feature.
///
/// ```ignore
/// crate::builder! {
///     pub struct JobRecordBuilder => JobRecord {
///         into { id: JobId = "job-test-1" }
///         set { state: JobState = JobState::Running }
///         option { end_date_ms: u64 = None }
///     }
/// }
///
/// let record = JobRecord::builder().state(JobState::Failed).end_date_ms(5u64).build();
/// ```
#[macro_export]
macro_rules! builder {
    (
        pub struct $builder:ident => $target:ident {
            into { $( $into_field:ident : $into_ty:ty = $into_default:expr ),* $(,)? }
            set { $( $set_field:ident : $set_ty:ty = $set_default:expr ),* $(,)? }
            option { $( $opt_field:ident : $opt_ty:ty = $opt_default:expr ),* $(,)? }
        }
    ) => {
        #[cfg(any(test, feature = "test-support"))]
        pub struct $builder($target);

        #[cfg(any(test, feature = "test-support"))]
        impl Default for $builder {
            fn default() -> Self {
                Self($target {
                    $( $into_field: $into_default.into(), )*
                    $( $set_field: $set_default, )*
                    $( $opt_field: $opt_default, )*
                })
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $builder {
            $(
                pub fn $into_field(mut self, v: impl Into<$into_ty>) -> Self {
                    self.0.$into_field = v.into();
                    self
                }
            )*
            $(
                pub fn $set_field(mut self, v: $set_ty) -> Self {
                    self.0.$set_field = v;
                    self
                }
            )*
            $(
                pub fn $opt_field(mut self, v: impl Into<$opt_ty>) -> Self {
                    self.0.$opt_field = Some(v.into());
                    self
                }
            )*

            pub fn build(self) -> $target {
                self.0
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $target {
            pub fn builder() -> $builder {
                $builder::default()
            }
        }
    };
}

/// Chained setters for fields of a builder's own `impl` block. `option`
/// fields are stored as `Option<_>`.
///
/// ```ignore
/// impl<S> JobBuilder<S> {
///     pulse_core::setters! {
///         set { listeners: Listeners }
///         option { heartrate: Duration, dag_id: String }
///     }
/// }
/// ```
#[macro_export]
macro_rules! setters {
    (
        $(set { $( $set_field:ident : $set_ty:ty ),* $(,)? })?
        $(option { $( $opt_field:ident : $opt_ty:ty ),* $(,)? })?
    ) => {
        $($(
            pub fn $set_field(mut self, v: $set_ty) -> Self {
                self.$set_field = v;
                self
            }
        )*)?
        $($(
            pub fn $opt_field(mut self, v: impl Into<$opt_ty>) -> Self {
                self.$opt_field = Some(v.into());
                self
            }
        )*)?
    };
}
