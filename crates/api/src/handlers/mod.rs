pub mod heygen;
pub mod liveavatar;
