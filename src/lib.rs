// Fichier principal de la bibliothèque rover-mission
// Expose tous les modules pour utilisation externe (par les binaires)

pub mod types;    // Types de base (CellKind, Heading, Severity, etc.)
pub mod error;    // Erreurs de mission et de configuration
pub mod grid;     // Grille de mission et génération procédurale
pub mod route;    // Recherche de chemin et pilote automatique
pub mod action;   // Actions primitives et leurs résultats
pub mod rover;    // État du rover
pub mod pacing;   // Délais de présentation injectables
pub mod events;   // Flux de journal et de rafraîchissement
pub mod engine;   // Moteur de simulation
pub mod config;   // Configuration de mission (TOML)
pub mod program;  // Ingestion des programmes et exécution séquentielle
pub mod display;  // Affichage terminal
pub mod network;  // Communication réseau et sérialisation

// Ré-exportation des types principaux pour faciliter l'importation
pub use action::{Action, ActionResult, Outcome};
pub use config::MissionConfig;
pub use engine::Engine;
pub use error::{ConfigurationError, MissionError};
pub use events::{EngineEvent, LogEvent, Snapshot};
pub use grid::{Grid, Position};
pub use program::{MissionReport, Program, run_program};
pub use rover::RoverState;
pub use types::*;
