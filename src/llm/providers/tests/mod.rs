mod openai_tests;
