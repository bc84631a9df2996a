//! Environment wrappers for JVMTI and JNI.
//!
//! [`Jvmti`] covers the capability calls and the class/method metadata
//! queries resolution makes; its table and string results are the guards
//! from [`crate::buffer`]. [`JniEnv`] covers the object model calls used to
//! build the result value, with [`LocalRef`] deleting local references on
//! drop.
//!
//! ```rust,ignore
//! use lambda_location::prelude::*;
//!
//! let jvmti = Jvmti::new(vm)?;
//! let methods = jvmti.get_class_methods(class)?;
//! for &method in methods.iter() {
//!     let name = jvmti.get_method_name(method)?;
//!     println!("{}", name.to_string_lossy());
//! } // name and method table are deallocated here
//! ```

pub use crate::jni_wrapper::{JniEnv, LocalRef};
pub use crate::jvmti_wrapper::Jvmti;
