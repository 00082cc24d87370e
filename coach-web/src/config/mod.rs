//! Configuration: coach tunables and the exercise catalog

mod catalog;
pub mod coach;
pub mod profiles;

pub use coach::CoachConfig;
pub use profiles::{
    BodySide, ExerciseCatalog, ExerciseMode, ExerciseProfile, HoldProfile, JointTriplet,
    RepProfile, StageLabels, TripletJoint,
};
