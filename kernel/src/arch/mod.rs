/// Architecture-specific drivers backing the shell's collaborator traits.
pub mod x86_64;
