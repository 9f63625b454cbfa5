pub mod functions;
pub mod gotrue;
pub mod microlink;
pub mod turnstile;
