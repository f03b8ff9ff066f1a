pub(crate) mod operation_guard;
