//! Test utilities for compiler and machine tests.
