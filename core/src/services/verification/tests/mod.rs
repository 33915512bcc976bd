mod ticker_tests;
