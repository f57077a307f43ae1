mod helpers;

mod script_tests;
