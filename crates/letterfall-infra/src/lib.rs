// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Letterfall Infra
//!
//! Concrete implementations of the contracts defined in `letterfall-core`:
//! a Rapier 2D physics world, the letter shape catalogue and an
//! OpenAI-compatible chat client used as a word source.

#![warn(missing_docs)]

#[cfg(feature = "chat")]
pub mod chat;
pub mod letters;
#[cfg(feature = "physics")]
pub mod physics;

#[cfg(feature = "chat")]
pub use chat::ChatClient;
pub use letters::LetterCatalogue;
#[cfg(feature = "physics")]
pub use physics::rapier::RapierWorld;
